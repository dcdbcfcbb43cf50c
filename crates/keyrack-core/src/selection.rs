//! Key selection for outbound requests.
//!
//! # Design
//! - The strategy override (`polling_enabled` + `polling_strategy`) wins over
//!   the channel's `multi_key_mode`.
//! - Polling and sequential selection keep separate cursors so switching
//!   strategies does not disturb the other rotation.
//! - Disabled keys are skipped by every strategy.

use rand::Rng;

use crate::error::{KeyError, KeyResult};
use crate::model::{Channel, KeyStatus, KeyStrategy, MultiKeyMode};

/// Key picked for a request together with its position in the key list.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedKey {
    /// Raw key material.
    pub key: String,
    /// Index of the key within the parsed key list.
    pub index: usize,
}

impl std::fmt::Debug for SelectedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedKey")
            .field("key", &crate::keys::mask_key(&self.key))
            .field("index", &self.index)
            .finish()
    }
}

/// Effective selection strategy for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Channel holds one key.
    Single,
    /// Random pick among enabled keys.
    Random,
    /// Rotation driven by the polling cursor.
    Polling,
    /// Rotation driven by the sequential cursor.
    Sequential,
}

impl Channel {
    /// Strategy that [`Channel::next_enabled_key`] will apply.
    #[must_use]
    pub fn selection_strategy(&self) -> SelectionStrategy {
        if !self.info.is_multi_key {
            return SelectionStrategy::Single;
        }
        if self.info.polling_enabled {
            return match self.info.polling_strategy.unwrap_or_default() {
                KeyStrategy::Random => SelectionStrategy::Random,
                KeyStrategy::Sequential => SelectionStrategy::Sequential,
            };
        }
        match self.info.multi_key_mode {
            MultiKeyMode::Random => SelectionStrategy::Random,
            MultiKeyMode::Polling => SelectionStrategy::Polling,
        }
    }

    /// Pick the next enabled key, advancing rotation cursors as needed.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::NoKeys`] when the channel has no keys and
    /// [`KeyError::AllKeysDisabled`] when none of them is enabled.
    pub fn next_enabled_key(&mut self) -> KeyResult<SelectedKey> {
        let channel_id = self.id;
        if !self.info.is_multi_key {
            let raw = self.key.trim();
            // A one-element JSON array holds its key inside the brackets.
            let key = if raw.starts_with('[') {
                self.keys().into_iter().next()
            } else {
                Some(raw.to_string())
            };
            return match key.filter(|key| !key.trim().is_empty()) {
                Some(key) => Ok(SelectedKey { key, index: 0 }),
                None => Err(KeyError::NoKeys { channel_id }),
            };
        }

        let keys = self.keys();
        if keys.is_empty() {
            return Err(KeyError::NoKeys { channel_id });
        }
        let enabled: Vec<usize> = (0..keys.len())
            .filter(|index| self.key_status_within(*index, keys.len()) == KeyStatus::Active)
            .collect();
        if enabled.is_empty() {
            return Err(KeyError::AllKeysDisabled { channel_id });
        }

        let index = match self.selection_strategy() {
            SelectionStrategy::Single | SelectionStrategy::Random => {
                enabled[rand::rng().random_range(0..enabled.len())]
            }
            SelectionStrategy::Polling => rotate(&mut self.info.polling_index, keys.len(), &enabled),
            SelectionStrategy::Sequential => {
                rotate(&mut self.info.sequential_index, keys.len(), &enabled)
            }
        };
        tracing::trace!(channel_id, index, "selected channel key");

        Ok(SelectedKey {
            key: keys[index].clone(),
            index,
        })
    }
}

/// Return the first enabled index at or after the cursor and move the cursor
/// past it. `enabled` must be non-empty and sorted.
fn rotate(cursor: &mut usize, len: usize, enabled: &[usize]) -> usize {
    let start = *cursor % len;
    let index = enabled
        .iter()
        .copied()
        .find(|index| *index >= start)
        .unwrap_or(enabled[0]);
    *cursor = (index + 1) % len;
    index
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::model::ChannelStatus;

    fn channel(mode: MultiKeyMode) -> Channel {
        let mut channel = Channel::new(1, "pool", "key1\nkey2\nkey3");
        channel.info.multi_key_mode = mode;
        channel
    }

    fn pick(channel: &mut Channel) -> String {
        channel.next_enabled_key().expect("key available").key
    }

    #[test]
    fn single_key_channel_returns_whole_key() {
        let mut channel = Channel::new(2, "solo", "  single-key  ");
        let selected = channel.next_enabled_key().expect("key available");
        assert_eq!(selected.key, "single-key");
        assert_eq!(selected.index, 0);
        assert_eq!(channel.selection_strategy(), SelectionStrategy::Single);
    }

    #[test]
    fn single_element_json_array_yields_its_element() {
        let mut channel = Channel::new(5, "wrapped", r#"["sk-only-key-1234"]"#);
        assert_eq!(channel.selection_strategy(), SelectionStrategy::Single);
        let selected = channel.next_enabled_key().expect("key available");
        assert_eq!(selected.key, "sk-only-key-1234");

        let mut object = Channel::new(6, "account", r#"{"type":"service_account"}"#);
        assert_eq!(pick(&mut object), r#"{"type":"service_account"}"#);

        let mut empty = Channel::new(7, "hollow", "[]");
        assert_eq!(
            empty.next_enabled_key(),
            Err(KeyError::NoKeys { channel_id: 7 })
        );
    }

    #[test]
    fn large_pools_rotate_without_reparsing_per_key() {
        let raw: Vec<String> = (0..20_000).map(|index| format!("key-{index}")).collect();
        let mut channel = Channel::new(8, "bulk", raw.join("\n"));
        channel.info.multi_key_mode = MultiKeyMode::Polling;
        channel.info.multi_key_status.insert(0, ChannelStatus::AutoDisabled);

        let started = std::time::Instant::now();
        assert_eq!(pick(&mut channel), "key-1");
        assert_eq!(pick(&mut channel), "key-2");
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn polling_walks_keys_in_order() {
        let mut channel = channel(MultiKeyMode::Polling);
        assert_eq!(pick(&mut channel), "key1");
        assert_eq!(channel.info.polling_index, 1);
        assert_eq!(pick(&mut channel), "key2");
        assert_eq!(pick(&mut channel), "key3");
        assert_eq!(channel.info.polling_index, 0);
        assert_eq!(pick(&mut channel), "key1");
    }

    #[test]
    fn sequential_strategy_overrides_mode_and_uses_its_own_cursor() {
        let mut channel = channel(MultiKeyMode::Random);
        channel
            .set_key_strategy(true, KeyStrategy::Sequential)
            .expect("multi-key channel");
        assert_eq!(channel.selection_strategy(), SelectionStrategy::Sequential);

        let order: Vec<String> = (0..4).map(|_| pick(&mut channel)).collect();
        assert_eq!(order, vec!["key1", "key2", "key3", "key1"]);
        assert_eq!(channel.info.sequential_index, 1);
        assert_eq!(channel.info.polling_index, 0);
    }

    #[test]
    fn disabled_strategy_override_falls_back_to_mode() {
        let mut channel = channel(MultiKeyMode::Polling);
        channel
            .set_key_strategy(false, KeyStrategy::Sequential)
            .expect("multi-key channel");
        assert_eq!(channel.selection_strategy(), SelectionStrategy::Polling);
    }

    #[test]
    fn random_mode_spreads_across_keys() {
        let mut channel = channel(MultiKeyMode::Random);
        let seen: HashSet<String> = (0..200).map(|_| pick(&mut channel)).collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn rotation_skips_disabled_keys() {
        let mut channel = channel(MultiKeyMode::Polling);
        channel
            .info
            .multi_key_status
            .insert(1, ChannelStatus::AutoDisabled);
        let order: Vec<String> = (0..3).map(|_| pick(&mut channel)).collect();
        assert_eq!(order, vec!["key1", "key3", "key1"]);
    }

    #[test]
    fn random_mode_never_picks_disabled_keys() {
        let mut channel = channel(MultiKeyMode::Random);
        channel
            .info
            .multi_key_status
            .insert(0, ChannelStatus::ManuallyDisabled);
        assert!((0..100).all(|_| pick(&mut channel) != "key1"));
    }

    #[test]
    fn empty_and_fully_disabled_channels_fail() {
        let mut empty = Channel::new(3, "empty", "");
        assert_eq!(
            empty.next_enabled_key(),
            Err(KeyError::NoKeys { channel_id: 3 })
        );

        let mut channel = channel(MultiKeyMode::Polling);
        for index in 0..3 {
            channel
                .info
                .multi_key_status
                .insert(index, ChannelStatus::AutoDisabled);
        }
        assert_eq!(
            channel.next_enabled_key(),
            Err(KeyError::AllKeysDisabled { channel_id: 1 })
        );
    }

    #[test]
    fn debug_masks_selected_key() {
        let selected = SelectedKey {
            key: "sk-abcdefghwxyz".into(),
            index: 0,
        };
        assert!(!format!("{selected:?}").contains("abcdefgh"));
    }
}
