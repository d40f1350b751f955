//! Staff position definitions and occupancy status.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use vigil_error::ConfigError;

/// Every position carries exactly this many application questions.
pub const QUESTION_COUNT: usize = 7;

/// A staff position open for applications.
///
/// Loaded from configuration at startup and immutable afterwards. Positions
/// are referenced by name throughout the workflow, and the same name is used
/// to find the guild role whose holders count toward the capacity limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct PositionDefinition {
    /// Display name, also the name of the guild role counted for occupancy.
    name: String,
    /// Capacity limit; the position is full once this many members hold the role.
    limit: usize,
    /// Embed accent color as a 24-bit RGB integer.
    color: u32,
    /// Emoji shown next to the position in menus.
    emoji: String,
    /// The seven question prompts, in presentation order.
    questions: Vec<String>,
}

impl PositionDefinition {
    /// Validate the definition.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the name is empty, the limit is zero, or
    /// the question list does not contain exactly [`QUESTION_COUNT`] prompts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::new("position name must not be empty"));
        }
        if self.limit == 0 {
            return Err(ConfigError::new(format!(
                "position '{}' has a limit of 0; it could never be applied for",
                self.name
            )));
        }
        if self.questions.len() != QUESTION_COUNT {
            return Err(ConfigError::new(format!(
                "position '{}' has {} questions, expected {}",
                self.name,
                self.questions.len(),
                QUESTION_COUNT
            )));
        }
        Ok(())
    }

    /// Question prompt at `index`, if in range.
    pub fn question(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }
}

/// Whether a position can currently accept applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PositionAvailability {
    /// Occupancy is below the limit.
    Open,
    /// Occupancy has reached the limit.
    Full,
}

/// A position paired with its live occupancy, as shown by `/positions`.
#[derive(Debug, Clone, Getters)]
pub struct PositionStatus {
    /// The position definition.
    position: PositionDefinition,
    /// Number of guild members currently holding the same-named role.
    occupancy: usize,
}

impl PositionStatus {
    /// Pair a position with its observed occupancy.
    pub fn new(position: PositionDefinition, occupancy: usize) -> Self {
        Self {
            position,
            occupancy,
        }
    }

    /// Open or full, by comparing occupancy to the configured limit.
    pub fn availability(&self) -> PositionAvailability {
        if self.occupancy >= *self.position.limit() {
            PositionAvailability::Full
        } else {
            PositionAvailability::Open
        }
    }

    /// True when no further applications are accepted.
    pub fn is_full(&self) -> bool {
        self.availability() == PositionAvailability::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(questions: usize) -> PositionDefinition {
        PositionDefinition {
            name: "Manager".to_string(),
            limit: 1,
            color: 0xFF0000,
            emoji: "👑".to_string(),
            questions: (1..=questions).map(|i| format!("Question {i}?")).collect(),
        }
    }

    #[test]
    fn test_validate_accepts_seven_questions() {
        assert!(manager(7).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_question_count() {
        let err = manager(5).validate().unwrap_err();
        assert!(err.message.contains("expected 7"));

        let err = manager(8).validate().unwrap_err();
        assert!(err.message.contains("expected 7"));
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut position = manager(7);
        position.limit = 0;
        assert!(position.validate().is_err());
    }

    #[test]
    fn test_availability_at_limit_is_full() {
        let status = PositionStatus::new(manager(7), 1);
        assert_eq!(status.availability(), PositionAvailability::Full);
        assert!(status.is_full());
    }

    #[test]
    fn test_availability_below_limit_is_open() {
        let status = PositionStatus::new(manager(7), 0);
        assert_eq!(status.availability(), PositionAvailability::Open);
        assert!(!status.is_full());
    }

    #[test]
    fn test_availability_over_limit_stays_full() {
        // Roles can be handed out manually; occupancy above the limit still reads as full.
        let status = PositionStatus::new(manager(7), 3);
        assert!(status.is_full());
    }
}
