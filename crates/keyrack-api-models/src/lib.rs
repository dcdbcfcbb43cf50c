#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::multiple_crate_versions)]
//! Shared HTTP DTOs for the Keyrack API.
//!
//! The server, the console logic and the CLI encode and decode the same
//! structures, so the wire contract lives in one place. Key views are the
//! domain types from `keyrack-core`; everything here carries masked key text
//! only.
use serde::{Deserialize, Serialize};

pub use keyrack_core::{
    ChannelId, ChannelKeyView, KeyModeConfig, KeyRecord, KeyStatus, KeyStrategy, KeyType,
    MultiKeyMode, ViewMode,
};

/// Response envelope shared by every `/api` endpoint.
///
/// A missing `success` field decodes as `false`, so malformed responses are
/// treated like application failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiEnvelope<T> {
    /// Whether the operation succeeded.
    #[serde(default)]
    pub success: bool,
    /// Payload on success.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable cause on failure, or an informational note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Successful envelope carrying `data`.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Failed envelope carrying a cause.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Split the envelope into its payload or its failure message.
    ///
    /// # Errors
    ///
    /// Returns the server message (which may be absent) when `success` is
    /// false or the payload is missing.
    pub fn into_result(self) -> Result<T, Option<String>> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.message.filter(|message| !message.trim().is_empty())),
        }
    }
}

/// Query string accepted by `GET /api/channel/{id}/key`.
///
/// The mode is kept as text so unknown values become envelope failures rather
/// than extractor rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyViewQuery {
    /// `count` or `masked`; defaults to `masked`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<String>,
}

impl KeyViewQuery {
    /// Query for the given mode.
    #[must_use]
    pub fn new(mode: ViewMode) -> Self {
        Self {
            view_mode: Some(mode.as_str().to_string()),
        }
    }
}

/// Read-only key collection summary consumed by the status indicator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeySummary {
    /// Number of keys held by the channel.
    #[serde(default)]
    pub key_count: usize,
    /// Per-key entries; may be empty even when `key_count > 0`.
    #[serde(default)]
    pub keys: Vec<KeyRecord>,
}

impl From<ChannelKeyView> for KeySummary {
    fn from(view: ChannelKeyView) -> Self {
        Self {
            key_count: view.key_count,
            keys: view.keys,
        }
    }
}

/// Body of `PATCH /api/channel/{id}/key-mode`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyModeRequest {
    /// `true` selects polling, `false` selects random.
    pub enabled: bool,
}

/// Payload returned after a key mode change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyModeResponse {
    /// Channel that was updated.
    pub channel_id: ChannelId,
    /// Mode now in effect.
    pub key_mode: MultiKeyMode,
    /// Echo of the polling switch.
    pub enabled: bool,
}

/// Body of `PUT /api/channel/{id}/key-strategy`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyStrategyRequest {
    /// Whether the strategy override is active.
    pub polling_enabled: bool,
    /// `random` or `sequential`.
    pub polling_strategy: String,
}

/// Payload returned after a strategy update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyStrategyResponse {
    /// Channel that was updated.
    pub channel_id: ChannelId,
    /// Whether the strategy override is active.
    pub polling_enabled: bool,
    /// Strategy now in effect.
    pub polling_strategy: KeyStrategy,
}

/// Body of `PATCH /api/channels/key-strategy`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchKeyStrategyRequest {
    /// Channels to update.
    pub channel_ids: Vec<ChannelId>,
    /// Whether the strategy override is active.
    pub polling_enabled: bool,
    /// `random` or `sequential`.
    pub polling_strategy: String,
}

/// Payload returned after a batch strategy update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchKeyStrategyResponse {
    /// Number of channels updated.
    pub updated: usize,
    /// Channels that were updated.
    pub channel_ids: Vec<ChannelId>,
    /// Channels left untouched (missing or single-key).
    #[serde(default)]
    pub skipped: Vec<ChannelId>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// `ok` when the service is serving.
    pub status: String,
    /// Number of channels in the store.
    pub channels: usize,
}
