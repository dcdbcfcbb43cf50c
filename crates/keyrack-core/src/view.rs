//! Masked key views served to clients.

use serde::{Deserialize, Serialize};

use crate::keys::mask_key;
use crate::model::{Channel, ChannelId, KeyModeConfig, KeyStatus, KeyType, MultiKeyMode, ViewMode};

/// Timestamp layout used for `last_used`.
pub const LAST_USED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CHANNEL_DISABLED_MESSAGE: &str = "channel disabled";

/// Per-key entry of a channel key view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Position of the key within the channel.
    pub index: usize,
    /// Masked key text.
    pub masked_key: String,
    /// Derived key health.
    pub status: KeyStatus,
    /// Last probe time, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<String>,
    /// Error attached to the key, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Masked view of a channel's keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelKeyView {
    /// Channel the view describes.
    pub channel_id: ChannelId,
    /// Encoding of the raw key string.
    pub key_type: KeyType,
    /// Number of keys held by the channel.
    pub key_count: usize,
    /// Whether the channel rotates across keys.
    pub is_multi_key: bool,
    /// Selection mode; present only for multi-key channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_key_mode: Option<MultiKeyMode>,
    /// Per-key entries.
    #[serde(default)]
    pub keys: Vec<KeyRecord>,
}

impl ChannelKeyView {
    /// Key configuration described by the view.
    #[must_use]
    pub fn key_mode(&self) -> KeyModeConfig {
        KeyModeConfig::from_flags(self.is_multi_key, self.multi_key_mode)
    }
}

/// Build the key view for `channel`.
///
/// The count view carries index, masked key and status per key. The masked
/// view adds the last probe time and an error message for disabled channels.
#[must_use]
pub fn channel_key_view(channel: &Channel, mode: ViewMode) -> ChannelKeyView {
    let keys = channel.keys();
    let detailed = mode == ViewMode::Masked;
    let last_used = channel
        .test_time
        .filter(|_| detailed)
        .map(|time| time.format(LAST_USED_FORMAT).to_string());
    let error_message = (detailed && !channel.status.is_enabled())
        .then(|| CHANNEL_DISABLED_MESSAGE.to_string());

    let records = keys
        .iter()
        .enumerate()
        .map(|(index, key)| KeyRecord {
            index,
            masked_key: mask_key(key),
            status: channel.key_status_within(index, keys.len()),
            last_used: last_used.clone(),
            error_message: error_message.clone(),
        })
        .collect();

    let key_mode = channel.key_mode();
    ChannelKeyView {
        channel_id: channel.id,
        key_type: channel.key_type(),
        key_count: keys.len(),
        is_multi_key: key_mode.is_multi_key(),
        multi_key_mode: key_mode.mode(),
        keys: records,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::ChannelStatus;

    fn channel() -> Channel {
        let mut channel = Channel::new(9, "pool", "sk-first-key-1111\nsk-second-key-2222");
        channel.test_time = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).single();
        channel
            .info
            .multi_key_status
            .insert(1, ChannelStatus::AutoDisabled);
        channel
    }

    #[test]
    fn masked_view_fills_per_key_details() {
        let view = channel_key_view(&channel(), ViewMode::Masked);
        assert_eq!(view.channel_id, 9);
        assert_eq!(view.key_type, KeyType::MultiLine);
        assert_eq!(view.key_count, 2);
        assert!(view.is_multi_key);
        assert_eq!(view.multi_key_mode, Some(MultiKeyMode::Random));
        assert_eq!(view.keys[0].masked_key, "sk-***1111");
        assert_eq!(view.keys[0].status, KeyStatus::Active);
        assert_eq!(view.keys[1].status, KeyStatus::Disabled);
        assert_eq!(view.keys[0].last_used.as_deref(), Some("2024-03-05 14:07:09"));
        assert_eq!(view.keys[0].error_message, None);
    }

    #[test]
    fn count_view_omits_timestamps() {
        let view = channel_key_view(&channel(), ViewMode::Count);
        assert_eq!(view.key_count, 2);
        assert_eq!(view.keys.len(), 2);
        assert!(view.keys.iter().all(|key| key.last_used.is_none()));
        assert_eq!(view.keys[1].status, KeyStatus::Disabled);
    }

    #[test]
    fn disabled_channel_reports_error_message() {
        let mut channel = Channel::new(4, "solo", "sk-single-secret");
        channel.status = ChannelStatus::ManuallyDisabled;
        let view = channel_key_view(&channel, ViewMode::Masked);
        assert_eq!(view.key_mode(), KeyModeConfig::SingleKey);
        assert_eq!(view.multi_key_mode, None);
        assert_eq!(view.keys[0].status, KeyStatus::Disabled);
        assert_eq!(view.keys[0].error_message.as_deref(), Some("channel disabled"));
    }

    #[test]
    fn large_key_lists_are_viewed_in_one_pass() {
        let raw: Vec<String> = (0..20_000).map(|index| format!("sk-bulk-key-{index:08}")).collect();
        let mut channel = Channel::new(11, "bulk", raw.join("\n"));
        channel
            .info
            .multi_key_status
            .insert(19_999, ChannelStatus::AutoDisabled);

        let started = std::time::Instant::now();
        let view = channel_key_view(&channel, ViewMode::Count);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(view.key_count, 20_000);
        assert_eq!(view.keys[0].status, KeyStatus::Active);
        assert_eq!(view.keys[19_999].status, KeyStatus::Disabled);
        assert_eq!(view.keys[19_999].masked_key, "sk-***9999");
    }

    #[test]
    fn serialised_view_never_contains_raw_key() {
        let view = channel_key_view(&channel(), ViewMode::Masked);
        let json = serde_json::to_string(&view).expect("serialise view");
        assert!(!json.contains("sk-first-key-1111"));
        assert!(!json.contains("multi_key_status"));
        assert!(json.contains("\"status\":\"disabled\""));
    }
}
