//! Render helpers for the key detail view.

use keyrack_api_models::{KeyModeConfig, KeyRecord, KeyStatus, KeyType, MultiKeyMode};

use crate::features::status::state::Color;

/// Status text and color for a key.
#[must_use]
pub const fn status_badge(status: KeyStatus) -> (&'static str, Color) {
    match status {
        KeyStatus::Active => ("active", Color::Green),
        KeyStatus::Disabled => ("disabled", Color::Red),
        KeyStatus::Unknown => ("unknown", Color::Orange),
    }
}

/// Human-readable key storage format.
#[must_use]
pub const fn key_type_text(key_type: KeyType) -> &'static str {
    match key_type {
        KeyType::Single => "single",
        KeyType::MultiLine => "multi-line",
        KeyType::MultiJson => "JSON array",
    }
}

/// Human-readable selection mode.
#[must_use]
pub const fn mode_text(mode: KeyModeConfig) -> &'static str {
    match mode {
        KeyModeConfig::SingleKey => "single key",
        KeyModeConfig::MultiKey {
            mode: MultiKeyMode::Random,
        } => "random",
        KeyModeConfig::MultiKey {
            mode: MultiKeyMode::Polling,
        } => "polling",
    }
}

/// Text placed on the clipboard by the copy action.
#[must_use]
pub fn copy_payload(record: &KeyRecord) -> &str {
    &record.masked_key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_badges_use_fixed_colors() {
        assert_eq!(status_badge(KeyStatus::Active), ("active", Color::Green));
        assert_eq!(status_badge(KeyStatus::Disabled), ("disabled", Color::Red));
        assert_eq!(status_badge(KeyStatus::Unknown), ("unknown", Color::Orange));
    }

    #[test]
    fn mode_text_names_single_key_channels() {
        assert_eq!(mode_text(KeyModeConfig::SingleKey), "single key");
        assert_eq!(
            mode_text(KeyModeConfig::MultiKey {
                mode: MultiKeyMode::Polling
            }),
            "polling"
        );
        assert_eq!(key_type_text(KeyType::MultiJson), "JSON array");
    }

    #[test]
    fn copy_payload_is_the_masked_text() {
        let record = KeyRecord {
            index: 0,
            masked_key: "sk-***wxyz".into(),
            status: KeyStatus::Active,
            last_used: None,
            error_message: None,
        };
        assert_eq!(copy_payload(&record), "sk-***wxyz");
    }
}
