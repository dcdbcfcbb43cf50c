//! Error types for channel key operations.

use thiserror::Error;

use crate::model::ChannelId;

/// Primary error type for channel key operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Channel was not found in the store.
    #[error("channel not found")]
    ChannelNotFound {
        /// Missing channel identifier.
        channel_id: ChannelId,
    },
    /// Channel carries no usable keys.
    #[error("channel has no keys")]
    NoKeys {
        /// Channel identifier.
        channel_id: ChannelId,
    },
    /// Every key on the channel is disabled.
    #[error("all channel keys are disabled")]
    AllKeysDisabled {
        /// Channel identifier.
        channel_id: ChannelId,
    },
    /// Operation requires a multi-key channel.
    #[error("channel is not in multi-key mode")]
    NotMultiKey {
        /// Channel identifier.
        channel_id: ChannelId,
    },
    /// Unrecognised view mode literal.
    #[error("unknown view mode")]
    InvalidViewMode {
        /// Value supplied by the caller.
        value: String,
    },
    /// Unrecognised key strategy literal.
    #[error("unknown key strategy")]
    InvalidStrategy {
        /// Value supplied by the caller.
        value: String,
    },
    /// Unrecognised multi-key mode literal.
    #[error("unknown multi-key mode")]
    InvalidMode {
        /// Value supplied by the caller.
        value: String,
    },
}

impl KeyError {
    /// Channel identifier attached to the error, when there is one.
    #[must_use]
    pub const fn channel_id(&self) -> Option<ChannelId> {
        match self {
            Self::ChannelNotFound { channel_id }
            | Self::NoKeys { channel_id }
            | Self::AllKeysDisabled { channel_id }
            | Self::NotMultiKey { channel_id } => Some(*channel_id),
            Self::InvalidViewMode { .. } | Self::InvalidStrategy { .. } | Self::InvalidMode { .. } => {
                None
            }
        }
    }
}

/// Convenience alias for channel key results.
pub type KeyResult<T> = Result<T, KeyError>;
