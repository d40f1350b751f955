//! Presence snapshots and the status-marker predicate.
//!
//! Gateway presence payloads are duck-typed upstream: any of the activity
//! fields may be missing. The snapshot types here model field absence
//! explicitly with `Option` so the predicate never relies on truthiness.
//! Conversion from the wire types lives in the Discord layer.

/// One activity from a member's presence, with explicit field presence.
///
/// A custom status arrives as an activity whose text lives in `state`; game
/// and rich-presence activities populate `name` and optionally `details`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivitySnapshot {
    /// Activity name (game title, or "Custom Status").
    pub name: Option<String>,
    /// Activity state; holds the custom-status text.
    pub state: Option<String>,
    /// Rich-presence details line.
    pub details: Option<String>,
}

impl ActivitySnapshot {
    fn mentions(&self, trigger: &str) -> bool {
        [&self.name, &self.state, &self.details]
            .into_iter()
            .flatten()
            .any(|field| field.contains(trigger))
    }
}

/// A member's presence as observed from the gateway.
///
/// `None` means no presence data was delivered for the member at all (offline
/// or presence intent not served); that is distinct from an empty activity
/// list, though both make [`PresenceSnapshot::has_marker`] return false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceSnapshot {
    /// Activities in the order the gateway delivered them.
    pub activities: Vec<ActivitySnapshot>,
}

impl PresenceSnapshot {
    /// True iff the trigger substring occurs in any activity's name, state,
    /// or details field. Case-sensitive, exact substring match.
    ///
    /// This is a pure predicate; it performs no I/O and has no side effects.
    pub fn has_marker(&self, trigger: &str) -> bool {
        self.activities
            .iter()
            .any(|activity| activity.mentions(trigger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGER: &str = "/Watchtower";

    fn custom_status(text: &str) -> ActivitySnapshot {
        ActivitySnapshot {
            name: Some("Custom Status".to_string()),
            state: Some(text.to_string()),
            details: None,
        }
    }

    #[test]
    fn test_marker_in_custom_status_text() {
        let presence = PresenceSnapshot {
            activities: vec![custom_status("come join /Watchtower today")],
        };
        assert!(presence.has_marker(TRIGGER));
    }

    #[test]
    fn test_marker_in_activity_name() {
        let presence = PresenceSnapshot {
            activities: vec![ActivitySnapshot {
                name: Some("playing /Watchtower".to_string()),
                ..Default::default()
            }],
        };
        assert!(presence.has_marker(TRIGGER));
    }

    #[test]
    fn test_marker_in_activity_state() {
        let presence = PresenceSnapshot {
            activities: vec![ActivitySnapshot {
                state: Some("/Watchtower lobby".to_string()),
                ..Default::default()
            }],
        };
        assert!(presence.has_marker(TRIGGER));
    }

    #[test]
    fn test_marker_in_activity_details() {
        let presence = PresenceSnapshot {
            activities: vec![ActivitySnapshot {
                details: Some("grinding /Watchtower rep".to_string()),
                ..Default::default()
            }],
        };
        assert!(presence.has_marker(TRIGGER));
    }

    #[test]
    fn test_no_presence_data_is_no_marker() {
        let presence = PresenceSnapshot::default();
        assert!(!presence.has_marker(TRIGGER));
    }

    #[test]
    fn test_absent_fields_do_not_match() {
        let presence = PresenceSnapshot {
            activities: vec![ActivitySnapshot::default()],
        };
        assert!(!presence.has_marker(TRIGGER));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let presence = PresenceSnapshot {
            activities: vec![custom_status("/watchtower")],
        };
        assert!(!presence.has_marker(TRIGGER));
    }

    #[test]
    fn test_substring_not_exact_match() {
        let presence = PresenceSnapshot {
            activities: vec![custom_status("xx/Watchtowerxx")],
        };
        assert!(presence.has_marker(TRIGGER));
    }

    #[test]
    fn test_second_activity_matches() {
        let presence = PresenceSnapshot {
            activities: vec![
                ActivitySnapshot {
                    name: Some("Chess".to_string()),
                    ..Default::default()
                },
                custom_status("/Watchtower"),
            ],
        };
        assert!(presence.has_marker(TRIGGER));
    }

    #[test]
    fn test_unrelated_activities_do_not_match() {
        let presence = PresenceSnapshot {
            activities: vec![
                ActivitySnapshot {
                    name: Some("Chess".to_string()),
                    state: Some("ranked queue".to_string()),
                    details: Some("5+3 blitz".to_string()),
                },
                custom_status("brb dinner"),
            ],
        };
        assert!(!presence.has_marker(TRIGGER));
    }
}
