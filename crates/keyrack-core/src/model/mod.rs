//! Channel domain types shared across the workspace.
//!
//! # Design
//! - The raw key string lives only on [`Channel`]; its `Debug` output redacts it.
//! - Wire-visible enums serialise as `snake_case` literals.
//! - Single-key versus multi-key configuration is surfaced as [`KeyModeConfig`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KeyError, KeyResult};
use crate::keys;

/// Numeric channel identifier.
pub type ChannelId = u64;

/// Lifecycle status of a channel or of one of its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    /// Channel (or key) is usable.
    #[default]
    Enabled,
    /// Disabled by an operator.
    ManuallyDisabled,
    /// Disabled automatically after upstream failures.
    AutoDisabled,
}

impl ChannelStatus {
    /// Whether the status allows traffic.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// Health of a single key as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    /// Key is usable.
    Active,
    /// Key is disabled.
    Disabled,
    /// Key health could not be determined.
    Unknown,
}

impl KeyStatus {
    /// Wire literal for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::Unknown => "unknown",
        }
    }
}

/// Selection mode used by multi-key channels when no strategy override is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MultiKeyMode {
    /// Pick an enabled key at random for each request.
    #[default]
    Random,
    /// Rotate through enabled keys in order.
    Polling,
}

impl MultiKeyMode {
    /// Wire literal for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Polling => "polling",
        }
    }

    /// Mode implied by the polling switch.
    #[must_use]
    pub const fn from_polling(enabled: bool) -> Self {
        if enabled { Self::Polling } else { Self::Random }
    }
}

impl FromStr for MultiKeyMode {
    type Err = KeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "random" => Ok(Self::Random),
            "polling" => Ok(Self::Polling),
            other => Err(KeyError::InvalidMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Explicit key strategy applied when polling is enabled on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// Random pick among enabled keys.
    #[default]
    Random,
    /// Walk enabled keys in order using the sequential cursor.
    Sequential,
}

impl KeyStrategy {
    /// Wire literal for the strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Sequential => "sequential",
        }
    }
}

impl FromStr for KeyStrategy {
    type Err = KeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "random" => Ok(Self::Random),
            "sequential" => Ok(Self::Sequential),
            other => Err(KeyError::InvalidStrategy {
                value: other.to_string(),
            }),
        }
    }
}

/// Encoding of the raw key string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    /// One key.
    Single,
    /// Newline separated keys.
    MultiLine,
    /// JSON encoded keys.
    MultiJson,
}

impl KeyType {
    /// Wire literal for the key type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::MultiLine => "multi_line",
            Self::MultiJson => "multi_json",
        }
    }
}

/// Requested shape of a channel key view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Counts plus per-key status only.
    Count,
    /// Full masked view including timestamps and errors.
    #[default]
    Masked,
}

impl ViewMode {
    /// Wire literal for the view mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Masked => "masked",
        }
    }
}

impl FromStr for ViewMode {
    type Err = KeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "count" => Ok(Self::Count),
            "masked" => Ok(Self::Masked),
            other => Err(KeyError::InvalidViewMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Key configuration of a channel as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyModeConfig {
    /// Channel carries exactly one key; there is no mode to choose.
    SingleKey,
    /// Channel rotates across several keys.
    MultiKey {
        /// Active selection mode.
        mode: MultiKeyMode,
    },
}

impl KeyModeConfig {
    /// Build the variant from the flat flag pair used on the wire.
    #[must_use]
    pub fn from_flags(is_multi_key: bool, mode: Option<MultiKeyMode>) -> Self {
        if is_multi_key {
            Self::MultiKey {
                mode: mode.unwrap_or_default(),
            }
        } else {
            Self::SingleKey
        }
    }

    /// Whether the configuration is multi-key.
    #[must_use]
    pub const fn is_multi_key(self) -> bool {
        matches!(self, Self::MultiKey { .. })
    }

    /// Selection mode for multi-key channels.
    #[must_use]
    pub const fn mode(self) -> Option<MultiKeyMode> {
        match self {
            Self::SingleKey => None,
            Self::MultiKey { mode } => Some(mode),
        }
    }
}

/// Multi-key bookkeeping stored alongside a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChannelInfo {
    /// Whether the raw key holds several keys.
    pub is_multi_key: bool,
    /// Number of keys recorded when the channel was saved.
    pub multi_key_size: usize,
    /// Selection mode used when no strategy override applies.
    pub multi_key_mode: MultiKeyMode,
    /// Per-key status overrides keyed by key index. Missing entries are active.
    pub multi_key_status: BTreeMap<usize, ChannelStatus>,
    /// Cursor used by polling mode.
    pub polling_index: usize,
    /// Whether the explicit strategy override is active.
    pub polling_enabled: bool,
    /// Strategy override; `None` until configured.
    pub polling_strategy: Option<KeyStrategy>,
    /// Cursor used by the sequential strategy.
    pub sequential_index: usize,
}

/// Relay channel and its upstream key material.
#[derive(Clone, PartialEq, Eq)]
pub struct Channel {
    /// Channel identifier.
    pub id: ChannelId,
    /// Display name.
    pub name: String,
    /// Channel-wide status.
    pub status: ChannelStatus,
    /// Raw key string; never leaves the process unmasked.
    pub key: String,
    /// Time of the last upstream probe.
    pub test_time: Option<DateTime<Utc>>,
    /// Multi-key bookkeeping.
    pub info: ChannelInfo,
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("status", &self.status)
            .field("key", &"<redacted>")
            .field("test_time", &self.test_time)
            .field("info", &self.info)
            .finish()
    }
}

impl Channel {
    /// Construct an enabled channel from a raw key, deriving multi-key
    /// bookkeeping from the key encoding.
    #[must_use]
    pub fn new(id: ChannelId, name: impl Into<String>, key: impl Into<String>) -> Self {
        let key = key.into();
        let parsed = keys::parse_keys(&key);
        let is_multi_key = parsed.len() > 1;
        Self {
            id,
            name: name.into(),
            status: ChannelStatus::Enabled,
            key,
            test_time: None,
            info: ChannelInfo {
                is_multi_key,
                multi_key_size: if is_multi_key { parsed.len() } else { 0 },
                ..ChannelInfo::default()
            },
        }
    }

    /// Parsed keys held by the channel.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        keys::parse_keys(&self.key)
    }

    /// Encoding of the raw key string.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        keys::detect_key_type(&self.key)
    }

    /// Client-facing key configuration.
    #[must_use]
    pub const fn key_mode(&self) -> KeyModeConfig {
        if self.info.is_multi_key {
            KeyModeConfig::MultiKey {
                mode: self.info.multi_key_mode,
            }
        } else {
            KeyModeConfig::SingleKey
        }
    }

    /// Status of the key at `index`.
    ///
    /// Single-key channels follow the channel status. Multi-key channels look
    /// up the per-key override and treat a missing entry as active. Indexes
    /// beyond the parsed key list report [`KeyStatus::Unknown`].
    #[must_use]
    pub fn key_status(&self, index: usize) -> KeyStatus {
        self.key_status_within(index, self.keys().len())
    }

    /// Status of the key at `index` when the caller already parsed
    /// `key_count` keys.
    #[must_use]
    pub fn key_status_within(&self, index: usize, key_count: usize) -> KeyStatus {
        if !self.info.is_multi_key {
            return if self.status.is_enabled() {
                KeyStatus::Active
            } else {
                KeyStatus::Disabled
            };
        }
        if index >= key_count {
            return KeyStatus::Unknown;
        }
        match self.info.multi_key_status.get(&index) {
            Some(status) if !status.is_enabled() => KeyStatus::Disabled,
            _ => KeyStatus::Active,
        }
    }

    /// Switch between polling and random selection.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::NotMultiKey`] for single-key channels.
    pub fn set_polling(&mut self, enabled: bool) -> KeyResult<MultiKeyMode> {
        self.ensure_multi_key()?;
        let mode = MultiKeyMode::from_polling(enabled);
        if self.info.multi_key_mode != mode {
            self.info.polling_index = 0;
        }
        self.info.multi_key_mode = mode;
        Ok(mode)
    }

    /// Configure the explicit key strategy override.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::NotMultiKey`] for single-key channels.
    pub fn set_key_strategy(&mut self, enabled: bool, strategy: KeyStrategy) -> KeyResult<()> {
        self.ensure_multi_key()?;
        if self.info.polling_strategy != Some(strategy) {
            self.info.sequential_index = 0;
        }
        self.info.polling_enabled = enabled;
        self.info.polling_strategy = Some(strategy);
        Ok(())
    }

    const fn ensure_multi_key(&self) -> KeyResult<()> {
        if self.info.is_multi_key {
            Ok(())
        } else {
            Err(KeyError::NotMultiKey {
                channel_id: self.id,
            })
        }
    }
}

/// Give multi-key channels without a strategy override the default
/// configuration (polling off, random strategy, sequential cursor reset).
///
/// Returns the number of channels that were updated.
pub fn apply_default_polling_strategy(channels: &mut [Channel]) -> usize {
    let mut updated = 0;
    for channel in channels
        .iter_mut()
        .filter(|channel| channel.info.is_multi_key)
    {
        if channel.info.polling_enabled || channel.info.polling_strategy.is_some() {
            continue;
        }
        channel.info.polling_enabled = false;
        channel.info.polling_strategy = Some(KeyStrategy::Random);
        channel.info.sequential_index = 0;
        updated += 1;
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multi_channel() -> Channel {
        Channel::new(1, "pool", "key-one\nkey-two\nkey-three")
    }

    #[test]
    fn new_channel_derives_multi_key_flags() {
        let multi = multi_channel();
        assert!(multi.info.is_multi_key);
        assert_eq!(multi.info.multi_key_size, 3);
        assert_eq!(
            multi.key_mode(),
            KeyModeConfig::MultiKey {
                mode: MultiKeyMode::Random
            }
        );

        let single = Channel::new(2, "solo", "sk-single");
        assert!(!single.info.is_multi_key);
        assert_eq!(single.key_mode(), KeyModeConfig::SingleKey);
    }

    #[test]
    fn debug_output_redacts_raw_key() {
        let channel = Channel::new(3, "secret", "sk-very-secret-value");
        let rendered = format!("{channel:?}");
        assert!(!rendered.contains("sk-very-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn single_key_status_follows_channel_status() {
        let mut channel = Channel::new(4, "solo", "sk-single");
        assert_eq!(channel.key_status(0), KeyStatus::Active);
        channel.status = ChannelStatus::AutoDisabled;
        assert_eq!(channel.key_status(0), KeyStatus::Disabled);
    }

    #[test]
    fn multi_key_status_uses_overrides_and_defaults_to_active() {
        let mut channel = multi_channel();
        channel
            .info
            .multi_key_status
            .insert(1, ChannelStatus::ManuallyDisabled);
        channel.info.multi_key_status.insert(2, ChannelStatus::Enabled);

        assert_eq!(channel.key_status(0), KeyStatus::Active);
        assert_eq!(channel.key_status(1), KeyStatus::Disabled);
        assert_eq!(channel.key_status(2), KeyStatus::Active);
        assert_eq!(channel.key_status(9), KeyStatus::Unknown);
    }

    #[test]
    fn set_polling_switches_mode_and_rejects_single_key() {
        let mut channel = multi_channel();
        channel.info.polling_index = 2;
        assert_eq!(channel.set_polling(true), Ok(MultiKeyMode::Polling));
        assert_eq!(channel.info.polling_index, 0);
        assert_eq!(channel.set_polling(false), Ok(MultiKeyMode::Random));

        let mut single = Channel::new(5, "solo", "sk-single");
        assert_eq!(
            single.set_polling(true),
            Err(KeyError::NotMultiKey { channel_id: 5 })
        );
    }

    #[test]
    fn set_key_strategy_records_override() {
        let mut channel = multi_channel();
        channel.info.sequential_index = 2;
        channel
            .set_key_strategy(true, KeyStrategy::Sequential)
            .expect("multi-key channel accepts strategy");
        assert!(channel.info.polling_enabled);
        assert_eq!(channel.info.polling_strategy, Some(KeyStrategy::Sequential));
        assert_eq!(channel.info.sequential_index, 0);
    }

    #[test]
    fn literals_parse_and_reject_unknown_values() {
        assert_eq!("sequential".parse(), Ok(KeyStrategy::Sequential));
        assert_eq!("polling".parse(), Ok(MultiKeyMode::Polling));
        assert_eq!("count".parse(), Ok(ViewMode::Count));
        assert!(matches!(
            "weighted".parse::<KeyStrategy>(),
            Err(KeyError::InvalidStrategy { .. })
        ));
        assert!(matches!(
            "full".parse::<ViewMode>(),
            Err(KeyError::InvalidViewMode { .. })
        ));
    }

    #[test]
    fn default_strategy_migration_only_touches_unconfigured_multi_key_channels() {
        let mut configured = multi_channel();
        configured.id = 10;
        configured.info.polling_enabled = true;
        configured.info.polling_strategy = Some(KeyStrategy::Sequential);

        let mut fresh = multi_channel();
        fresh.id = 11;
        fresh.info.sequential_index = 4;

        let single = Channel::new(12, "solo", "sk-single");
        let mut channels = vec![configured.clone(), fresh, single.clone()];

        assert_eq!(apply_default_polling_strategy(&mut channels), 1);
        assert_eq!(channels[0], configured);
        assert_eq!(channels[1].info.polling_strategy, Some(KeyStrategy::Random));
        assert!(!channels[1].info.polling_enabled);
        assert_eq!(channels[1].info.sequential_index, 0);
        assert_eq!(channels[2], single);
    }

    #[test]
    fn key_mode_config_round_trips_flags() {
        let config = KeyModeConfig::from_flags(true, Some(MultiKeyMode::Polling));
        assert!(config.is_multi_key());
        assert_eq!(config.mode(), Some(MultiKeyMode::Polling));
        assert_eq!(KeyModeConfig::from_flags(false, None).mode(), None);
    }
}
