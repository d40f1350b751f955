//! Submitted application records and id generation.

use crate::{GuildId, UserId};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use rand::Rng;

const ID_LENGTH: usize = 6;
const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A submitted, not-yet-reviewed application.
///
/// Created at submit time from a finished session and appended to the guild's
/// pending list. Never mutated afterwards; the only removal path is a process
/// restart.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct SubmittedApplication {
    /// Short random identifier, e.g. `K3F9ZQ`.
    id: String,
    /// Submitting user's id.
    user_id: UserId,
    /// Submitting user's display name at submission time.
    username: String,
    /// Avatar URL at submission time, when one was set.
    #[builder(default)]
    avatar_url: Option<String>,
    /// Position applied for.
    position: String,
    /// The seven finalized answers, trimmed, in question order.
    answers: Vec<String>,
    /// When the application was submitted.
    submitted_at: DateTime<Utc>,
    /// Guild the application belongs to.
    guild_id: GuildId,
}

impl SubmittedApplication {
    /// Unix timestamp of submission, as used in relative-time markers.
    pub fn submitted_unix(&self) -> i64 {
        self.submitted_at.timestamp()
    }
}

/// Generate an application id: 6 random base-36 characters, upper-cased.
pub fn generate_application_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..ID_ALPHABET.len());
            ID_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_six_uppercase_base36_chars() {
        for _ in 0..100 {
            let id = generate_application_id();
            assert_eq!(id.len(), 6);
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
            );
        }
    }

    #[test]
    fn test_ids_vary() {
        let ids: std::collections::HashSet<String> =
            (0..50).map(|_| generate_application_id()).collect();
        // 36^6 values; 50 draws colliding down to one would mean a broken generator.
        assert!(ids.len() > 1);
    }

    #[test]
    fn test_builder_produces_record() {
        let application = SubmittedApplicationBuilder::default()
            .id(generate_application_id())
            .user_id(42u64)
            .username("applicant")
            .position("Manager")
            .answers(vec!["a".to_string(); 7])
            .submitted_at(Utc::now())
            .guild_id(7u64)
            .build()
            .unwrap();

        assert_eq!(application.answers().len(), 7);
        assert_eq!(application.avatar_url(), &None);
    }
}
