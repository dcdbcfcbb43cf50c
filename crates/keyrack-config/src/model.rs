//! Typed configuration document.

use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keyrack_core::{Channel, ChannelId, ChannelInfo, ChannelStatus, KeyStrategy, MultiKeyMode};

use crate::defaults::{default_bind_addr, default_log_level};

/// Top-level service configuration.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the HTTP service binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Bearer token guarding `/api/*`; open access when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
    /// Logging preferences.
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Channels loaded into the store at startup.
    #[serde(default)]
    pub channels: Vec<ChannelSeed>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            admin_token: None,
            logging: LoggingSettings::default(),
            channels: Vec::new(),
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field(
                "admin_token",
                &self.admin_token.as_ref().map(|_| "<redacted>"),
            )
            .field("logging", &self.logging)
            .field("channels", &self.channels)
            .finish()
    }
}

/// Logging preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Tracing filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format; inferred from the build profile when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormatSetting>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

/// Log output format literal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    /// Structured JSON.
    Json,
    /// Human-readable text.
    Pretty,
}

/// Channel definition loaded into the store.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ChannelSeed {
    /// Channel identifier.
    pub id: ChannelId,
    /// Display name.
    pub name: String,
    /// Raw key string (single key, newline list or JSON array).
    pub key: String,
    /// Channel-wide status.
    #[serde(default)]
    pub status: ChannelStatus,
    /// Time of the last upstream probe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_time: Option<DateTime<Utc>>,
    /// Forces multi-key handling; derived from the key when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_multi_key: Option<bool>,
    /// Selection mode for multi-key channels.
    #[serde(default)]
    pub multi_key_mode: MultiKeyMode,
    /// Per-key status overrides keyed by index.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub key_status: BTreeMap<usize, ChannelStatus>,
    /// Whether the strategy override is active.
    #[serde(default)]
    pub polling_enabled: bool,
    /// Strategy override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_strategy: Option<KeyStrategy>,
}

impl fmt::Debug for ChannelSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSeed")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("key", &"<redacted>")
            .field("status", &self.status)
            .field("is_multi_key", &self.is_multi_key)
            .field("multi_key_mode", &self.multi_key_mode)
            .finish_non_exhaustive()
    }
}

impl ChannelSeed {
    /// Build the domain channel described by the seed.
    #[must_use]
    pub fn into_channel(self) -> Channel {
        let mut channel = Channel::new(self.id, self.name, self.key);
        let is_multi_key = self.is_multi_key.unwrap_or(channel.info.is_multi_key);
        let key_count = channel.keys().len();
        channel.status = self.status;
        channel.test_time = self.test_time;
        channel.info = ChannelInfo {
            is_multi_key,
            multi_key_size: if is_multi_key { key_count } else { 0 },
            multi_key_mode: self.multi_key_mode,
            multi_key_status: self.key_status,
            polling_enabled: self.polling_enabled,
            polling_strategy: self.polling_strategy,
            ..ChannelInfo::default()
        };
        channel
    }
}
