//! User-facing notices emitted by console actions.

use crate::services::api::FetchError;

/// Fallback text when the server rejects an action without a message.
pub const GENERIC_FAILURE: &str = "operation failed";

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Action succeeded.
    Success,
    /// Action failed.
    Error,
}

/// Message shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity of the notice.
    pub level: NoticeLevel,
    /// Text to display.
    pub text: String,
}

impl Notice {
    /// Success notice.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    /// Error notice.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    /// Error notice for a failed request.
    ///
    /// Application rejections show the server message verbatim (or the
    /// generic text when there is none); transport failures are prefixed with
    /// the generic text.
    #[must_use]
    pub fn from_fetch_error(err: &FetchError) -> Self {
        match err {
            FetchError::Rejected { message } => {
                Self::error(message.clone().unwrap_or_else(|| GENERIC_FAILURE.to_string()))
            }
            FetchError::Transport { detail } => Self::error(format!("{GENERIC_FAILURE}: {detail}")),
        }
    }
}
