//! The grant/revoke decision for presence reconciliation.

use crate::PresenceSnapshot;

/// The correction (if any) that brings a member's role in line with their
/// status marker.
///
/// Two observed bits — marker present, role held — yield four combinations;
/// only the two mismatches produce an action. Repeating the decision with
/// unchanged inputs yields [`ReconcileAction::None`], which is what makes the
/// periodic sweep and the event fast path safe to run concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReconcileAction {
    /// Marker present, role missing: grant it.
    Grant,
    /// Marker absent, role held: revoke it.
    Revoke,
    /// Already consistent.
    None,
}

impl ReconcileAction {
    /// Decide the correction for one member.
    ///
    /// `presence` is `None` when the gateway delivered no presence data for
    /// the member, which counts as marker-absent.
    pub fn decide(presence: Option<&PresenceSnapshot>, trigger: &str, has_role: bool) -> Self {
        let wants_role = presence.is_some_and(|p| p.has_marker(trigger));
        match (wants_role, has_role) {
            (true, false) => Self::Grant,
            (false, true) => Self::Revoke,
            _ => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActivitySnapshot;

    const TRIGGER: &str = "/Watchtower";

    fn marked() -> PresenceSnapshot {
        PresenceSnapshot {
            activities: vec![ActivitySnapshot {
                state: Some("/Watchtower".to_string()),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_marker_without_role_grants() {
        let presence = marked();
        assert_eq!(
            ReconcileAction::decide(Some(&presence), TRIGGER, false),
            ReconcileAction::Grant
        );
    }

    #[test]
    fn test_no_marker_with_role_revokes() {
        let presence = PresenceSnapshot::default();
        assert_eq!(
            ReconcileAction::decide(Some(&presence), TRIGGER, true),
            ReconcileAction::Revoke
        );
        assert_eq!(
            ReconcileAction::decide(None, TRIGGER, true),
            ReconcileAction::Revoke
        );
    }

    #[test]
    fn test_consistent_states_are_stable() {
        let presence = marked();
        assert_eq!(
            ReconcileAction::decide(Some(&presence), TRIGGER, true),
            ReconcileAction::None
        );
        assert_eq!(
            ReconcileAction::decide(None, TRIGGER, false),
            ReconcileAction::None
        );
    }

    #[test]
    fn test_idempotent_after_correction() {
        // Apply the decided action, then decide again with the updated role
        // state: the second pass must be a no-op.
        let presence = marked();
        let first = ReconcileAction::decide(Some(&presence), TRIGGER, false);
        assert_eq!(first, ReconcileAction::Grant);

        let second = ReconcileAction::decide(Some(&presence), TRIGGER, true);
        assert_eq!(second, ReconcileAction::None);
    }
}
