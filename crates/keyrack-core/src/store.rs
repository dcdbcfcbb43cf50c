//! Channel storage shared by request handlers.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{KeyError, KeyResult};
use crate::model::{Channel, ChannelId, KeyStrategy, MultiKeyMode, apply_default_polling_strategy};
use crate::selection::SelectedKey;

/// Storage seam for channels and their key bookkeeping.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// Fetch a snapshot of a channel.
    async fn get(&self, id: ChannelId) -> KeyResult<Channel>;

    /// Identifiers of every stored channel, ascending.
    async fn ids(&self) -> Vec<ChannelId>;

    /// Switch a channel between polling and random selection.
    async fn set_polling(&self, id: ChannelId, enabled: bool) -> KeyResult<MultiKeyMode>;

    /// Configure a channel's strategy override.
    async fn set_key_strategy(
        &self,
        id: ChannelId,
        enabled: bool,
        strategy: KeyStrategy,
    ) -> KeyResult<()>;

    /// Configure the strategy override on several channels at once.
    ///
    /// Returns one outcome per id, in input order.
    async fn set_key_strategy_many(
        &self,
        ids: &[ChannelId],
        enabled: bool,
        strategy: KeyStrategy,
    ) -> Vec<(ChannelId, KeyResult<()>)>;

    /// Pick the next enabled key for a channel, advancing its cursors.
    async fn next_enabled_key(&self, id: ChannelId) -> KeyResult<SelectedKey>;
}

/// In-memory store guarded by a single `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryChannelStore {
    channels: RwLock<BTreeMap<ChannelId, Channel>>,
}

impl InMemoryChannelStore {
    /// Build a store from channel seeds, applying the default strategy
    /// migration to multi-key channels that lack one.
    #[must_use]
    pub fn with_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        let mut channels: Vec<Channel> = channels.into_iter().collect();
        let migrated = apply_default_polling_strategy(&mut channels);
        if migrated > 0 {
            tracing::info!(migrated, "applied default key strategy to multi-key channels");
        }
        Self {
            channels: RwLock::new(
                channels
                    .into_iter()
                    .map(|channel| (channel.id, channel))
                    .collect(),
            ),
        }
    }

    /// Number of stored channels.
    pub async fn len(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Whether the store holds no channels.
    pub async fn is_empty(&self) -> bool {
        self.channels.read().await.is_empty()
    }

    /// Insert or replace a channel.
    pub async fn upsert(&self, channel: Channel) {
        self.channels.write().await.insert(channel.id, channel);
    }

    async fn mutate<T>(
        &self,
        id: ChannelId,
        apply: impl FnOnce(&mut Channel) -> KeyResult<T> + Send,
    ) -> KeyResult<T> {
        let mut guard = self.channels.write().await;
        let channel = guard
            .get_mut(&id)
            .ok_or(KeyError::ChannelNotFound { channel_id: id })?;
        apply(channel)
    }
}

#[async_trait]
impl ChannelStore for InMemoryChannelStore {
    async fn get(&self, id: ChannelId) -> KeyResult<Channel> {
        self.channels
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(KeyError::ChannelNotFound { channel_id: id })
    }

    async fn ids(&self) -> Vec<ChannelId> {
        self.channels.read().await.keys().copied().collect()
    }

    async fn set_polling(&self, id: ChannelId, enabled: bool) -> KeyResult<MultiKeyMode> {
        self.mutate(id, |channel| channel.set_polling(enabled)).await
    }

    async fn set_key_strategy(
        &self,
        id: ChannelId,
        enabled: bool,
        strategy: KeyStrategy,
    ) -> KeyResult<()> {
        self.mutate(id, |channel| channel.set_key_strategy(enabled, strategy))
            .await
    }

    async fn set_key_strategy_many(
        &self,
        ids: &[ChannelId],
        enabled: bool,
        strategy: KeyStrategy,
    ) -> Vec<(ChannelId, KeyResult<()>)> {
        let mut guard = self.channels.write().await;
        ids.iter()
            .map(|&id| {
                let outcome = guard
                    .get_mut(&id)
                    .ok_or(KeyError::ChannelNotFound { channel_id: id })
                    .and_then(|channel| channel.set_key_strategy(enabled, strategy));
                (id, outcome)
            })
            .collect()
    }

    async fn next_enabled_key(&self, id: ChannelId) -> KeyResult<SelectedKey> {
        self.mutate(id, Channel::next_enabled_key).await
    }
}
