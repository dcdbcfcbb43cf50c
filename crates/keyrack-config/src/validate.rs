//! Validation of a loaded configuration.

use std::collections::BTreeSet;

use crate::error::{ConfigError, ConfigResult};
use crate::model::ServerConfig;

/// Validate cross-field constraints the type system does not capture.
///
/// # Errors
///
/// Returns the first violation found: a zero port, a blank log level, an
/// admin token containing whitespace, a blank channel name or a repeated
/// channel id.
pub fn validate(config: &ServerConfig) -> ConfigResult<()> {
    if config.bind_addr.port() == 0 {
        return Err(ConfigError::invalid(
            "server",
            "bind_addr",
            Some(config.bind_addr.to_string()),
            "port must be non-zero",
        ));
    }
    if config.logging.level.trim().is_empty() {
        return Err(ConfigError::invalid(
            "logging",
            "level",
            None,
            "must not be empty",
        ));
    }
    if let Some(token) = &config.admin_token {
        if token.is_empty() || token.chars().any(char::is_whitespace) {
            return Err(ConfigError::invalid(
                "server",
                "admin_token",
                None,
                "must be non-empty without whitespace",
            ));
        }
    }

    let mut seen = BTreeSet::new();
    for channel in &config.channels {
        if channel.name.trim().is_empty() {
            return Err(ConfigError::invalid(
                "channels",
                "name",
                Some(channel.id.to_string()),
                "must not be empty",
            ));
        }
        if !seen.insert(channel.id) {
            return Err(ConfigError::DuplicateChannel {
                channel_id: channel.id,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChannelSeed;
    use keyrack_core::{ChannelStatus, MultiKeyMode};

    fn seed(id: u64, name: &str) -> ChannelSeed {
        ChannelSeed {
            id,
            name: name.into(),
            key: "sk-test".into(),
            status: ChannelStatus::Enabled,
            test_time: None,
            is_multi_key: None,
            multi_key_mode: MultiKeyMode::Random,
            key_status: Default::default(),
            polling_enabled: false,
            polling_strategy: None,
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn rejects_duplicate_channel_ids() {
        let config = ServerConfig {
            channels: vec![seed(1, "a"), seed(1, "b")],
            ..ServerConfig::default()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::DuplicateChannel { channel_id: 1 })
        ));
    }

    #[test]
    fn rejects_blank_names_and_tokens() {
        let blank_name = ServerConfig {
            channels: vec![seed(2, "  ")],
            ..ServerConfig::default()
        };
        assert!(matches!(
            validate(&blank_name),
            Err(ConfigError::InvalidField { field: "name", .. })
        ));

        let spaced_token = ServerConfig {
            admin_token: Some("two words".into()),
            ..ServerConfig::default()
        };
        assert!(matches!(
            validate(&spaced_token),
            Err(ConfigError::InvalidField {
                field: "admin_token",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_port() {
        let mut config = ServerConfig::default();
        config.bind_addr.set_port(0);
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidField {
                field: "bind_addr",
                ..
            })
        ));
    }
}
