//! Envelope-shaped API errors.
//!
//! # Design
//! - Transport-level problems (bad path, bad body, missing token) carry a 4xx
//!   status; domain rejections keep HTTP 200 and set `success = false`.
//! - The body is always an [`ApiEnvelope`] so clients have one shape to parse.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use keyrack_api_models::ApiEnvelope;
use keyrack_core::KeyError;

/// Error returned by handlers and middleware.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Application-level rejection reported with HTTP 200.
    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message)
    }
}

impl From<KeyError> for ApiError {
    fn from(err: KeyError) -> Self {
        let message = match &err {
            KeyError::ChannelNotFound { channel_id } => format!("channel {channel_id} not found"),
            KeyError::NotMultiKey { channel_id } => {
                format!("channel {channel_id} is not in multi-key mode")
            }
            KeyError::InvalidViewMode { value } => {
                format!("unknown view mode '{value}', expected count or masked")
            }
            KeyError::InvalidStrategy { value } => {
                format!("unknown key strategy '{value}', expected random or sequential")
            }
            KeyError::InvalidMode { value } => {
                format!("unknown multi-key mode '{value}', expected random or polling")
            }
            KeyError::NoKeys { .. } | KeyError::AllKeysDisabled { .. } => err.to_string(),
        };
        Self::rejected(message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(format!("invalid path: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("invalid query: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiEnvelope::<()>::failure(self.message))).into_response()
    }
}
