//! Runtime configuration for the bot.
//!
//! Loaded once at startup from a TOML file. The flags here collapse what were
//! historically parallel deployments of the same bot into one binary:
//! `provision_role` (create the marker role when missing),
//! `enforce_single_pending` (reject re-application while a submission is
//! pending), `prefix` (legacy text commands; absent means disabled), and
//! `reminder_interval_secs` (periodic promo post; absent means disabled).

use crate::position::PositionDefinition;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use vigil_error::{ConfigError, VigilResult};

/// Discord user identifier.
pub type UserId = u64;
/// Discord guild (server) identifier.
pub type GuildId = u64;
/// Discord channel identifier.
pub type ChannelId = u64;

/// Bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_", into)]
pub struct VigilConfig {
    /// Name of the role granted to members carrying the status marker.
    role_name: String,

    /// Substring a member places in their status to request the role.
    status_trigger: String,

    /// Full-scan reconciliation interval in milliseconds.
    #[serde(default = "default_check_interval_ms")]
    check_interval_ms: u64,

    /// Create the marker role (with the default color) when a guild lacks it.
    #[serde(default)]
    provision_role: bool,

    /// Reject a new application while the user has a pending submission.
    #[serde(default = "default_enforce_single_pending")]
    enforce_single_pending: bool,

    /// Prefix for legacy text commands; `None` disables them.
    #[serde(default)]
    prefix: Option<String>,

    /// Interval for the promotional reminder post; `None` disables it.
    #[serde(default)]
    reminder_interval_secs: Option<u64>,

    /// Staff positions open for applications.
    #[serde(default)]
    positions: Vec<PositionDefinition>,
}

fn default_check_interval_ms() -> u64 {
    10_000
}

fn default_enforce_single_pending() -> bool {
    true
}

impl Default for VigilConfig {
    fn default() -> Self {
        Self {
            role_name: String::new(),
            status_trigger: String::new(),
            check_interval_ms: default_check_interval_ms(),
            provision_role: false,
            enforce_single_pending: default_enforce_single_pending(),
            prefix: None,
            reminder_interval_secs: None,
            positions: Vec::new(),
        }
    }
}

impl VigilConfig {
    /// Load configuration from a TOML file and validate it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file cannot be read or parsed, or
    /// when validation fails (see [`VigilConfig::validate`]).
    pub fn from_file(path: impl AsRef<Path>) -> VigilResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the role name or trigger is empty, a
    /// position definition is invalid, or two positions share a name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.role_name.trim().is_empty() {
            return Err(ConfigError::new("role_name must not be empty"));
        }
        if self.status_trigger.is_empty() {
            return Err(ConfigError::new("status_trigger must not be empty"));
        }
        if self.check_interval_ms == 0 {
            return Err(ConfigError::new("check_interval_ms must be positive"));
        }
        if let Some(prefix) = &self.prefix
            && prefix.is_empty()
        {
            return Err(ConfigError::new("prefix must not be empty when set"));
        }

        let mut seen = std::collections::HashSet::new();
        for position in &self.positions {
            position.validate()?;
            if !seen.insert(position.name().as_str()) {
                return Err(ConfigError::new(format!(
                    "duplicate position name '{}'",
                    position.name()
                )));
            }
        }
        Ok(())
    }

    /// Find a position by name.
    pub fn position(&self, name: &str) -> Option<&PositionDefinition> {
        self.positions.iter().find(|p| p.name() == name)
    }

    /// Names of all configured positions, in configuration order.
    pub fn position_names(&self) -> Vec<&str> {
        self.positions.iter().map(|p| p.name().as_str()).collect()
    }

    /// Full-scan interval as a [`Duration`].
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    /// Reminder interval as a [`Duration`], when the loop is enabled.
    pub fn reminder_interval(&self) -> Option<Duration> {
        self.reminder_interval_secs.map(Duration::from_secs)
    }

    /// True when legacy prefix commands are enabled.
    pub fn prefix_commands_enabled(&self) -> bool {
        self.prefix.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_toml(questions: usize) -> String {
        let prompts: Vec<String> = (1..=questions).map(|i| format!("\"Q{i}?\"")).collect();
        format!(
            r#"
            [[positions]]
            name = "Manager"
            limit = 1
            color = 0xFF0000
            emoji = "👑"
            questions = [{}]
            "#,
            prompts.join(", ")
        )
    }

    fn base_toml() -> String {
        r#"
        role_name = "Pic Perms"
        status_trigger = "/Watchtower"
        "#
        .to_string()
    }

    #[test]
    fn test_parse_minimal_config_applies_defaults() {
        let config: VigilConfig = toml::from_str(&base_toml()).unwrap();
        config.validate().unwrap();

        assert_eq!(*config.check_interval_ms(), 10_000);
        assert!(*config.enforce_single_pending());
        assert!(!*config.provision_role());
        assert!(config.prefix().is_none());
        assert!(config.reminder_interval().is_none());
        assert!(!config.prefix_commands_enabled());
    }

    #[test]
    fn test_parse_config_with_position() {
        let toml = base_toml() + &position_toml(7);
        let config: VigilConfig = toml::from_str(&toml).unwrap();
        config.validate().unwrap();

        let position = config.position("Manager").unwrap();
        assert_eq!(*position.limit(), 1);
        assert_eq!(position.questions().len(), 7);
        assert_eq!(config.position_names(), vec!["Manager"]);
    }

    #[test]
    fn test_validate_rejects_position_without_seven_questions() {
        let toml = base_toml() + &position_toml(6);
        let config: VigilConfig = toml::from_str(&toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.message.contains("expected 7"));
    }

    #[test]
    fn test_validate_rejects_duplicate_position_names() {
        let toml = base_toml() + &position_toml(7) + &position_toml(7);
        let config: VigilConfig = toml::from_str(&toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.message.contains("duplicate"));
    }

    #[test]
    fn test_validate_rejects_empty_role_name() {
        let config = VigilConfig::default().with_status_trigger("/Watchtower");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_check_interval_conversion() {
        let config: VigilConfig =
            toml::from_str(&(base_toml() + "check_interval_ms = 2500\n")).unwrap();
        assert_eq!(config.check_interval(), Duration::from_millis(2500));
    }

    #[test]
    fn test_prefix_enables_legacy_commands() {
        let config: VigilConfig = toml::from_str(&(base_toml() + "prefix = \"$\"\n")).unwrap();
        config.validate().unwrap();
        assert!(config.prefix_commands_enabled());
        assert_eq!(config.prefix().as_deref(), Some("$"));
    }
}
