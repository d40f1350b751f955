//! Conversions between serenity wire types and domain types.
//!
//! Gateway payloads carry optional fields everywhere; the domain layer wants
//! explicit `Option` snapshots it can test without a gateway. All mapping
//! from serenity lives here so the rest of the crate deals in domain types.

use serenity::gateway::ActivityData;
use serenity::model::gateway::{Activity, Presence};
use serenity::model::id::GuildId;
use serenity::prelude::Context;
use std::collections::HashMap;
use vigil_core::{ActivitySnapshot, PresenceSnapshot};

fn activity_snapshot(activity: &Activity) -> ActivitySnapshot {
    ActivitySnapshot {
        name: (!activity.name.is_empty()).then(|| activity.name.clone()),
        state: activity.state.clone(),
        details: activity.details.clone(),
    }
}

/// Snapshot one gateway presence payload.
pub fn presence_snapshot(presence: &Presence) -> PresenceSnapshot {
    PresenceSnapshot {
        activities: presence.activities.iter().map(activity_snapshot).collect(),
    }
}

/// Snapshot every cached presence for a guild, keyed by user id.
///
/// Presence data only exists in the gateway cache; the copy lets callers
/// iterate members across await points without holding the cache guard.
pub fn snapshot_guild_presences(
    ctx: &Context,
    guild_id: GuildId,
) -> HashMap<u64, PresenceSnapshot> {
    ctx.cache
        .guild(guild_id)
        .map(|guild| {
            guild
                .presences
                .iter()
                .map(|(user_id, presence)| (user_id.get(), presence_snapshot(presence)))
                .collect()
        })
        .unwrap_or_default()
}

/// Snapshot the cached presence of a single member, if the gateway delivered
/// one.
pub fn snapshot_member_presence(
    ctx: &Context,
    guild_id: GuildId,
    user_id: serenity::model::id::UserId,
) -> Option<PresenceSnapshot> {
    ctx.cache
        .guild(guild_id)
        .and_then(|guild| guild.presences.get(&user_id).map(presence_snapshot))
}

/// The bot's own gateway activity, shown under its name in the member list.
pub fn watching_activity(status_trigger: &str) -> ActivityData {
    ActivityData::watching(format!("for {status_trigger} | /apply"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watching_activity_names_trigger() {
        let activity = watching_activity("/Watchtower");
        assert!(activity.name.contains("/Watchtower"));
    }
}
