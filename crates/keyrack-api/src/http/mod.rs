//! HTTP routing, middleware and handlers.

pub(crate) mod auth;
pub(crate) mod errors;
pub(crate) mod health;
pub(crate) mod keys;
pub(crate) mod router;
pub(crate) mod telemetry;

use crate::http::errors::ApiError;
use keyrack_core::ChannelId;

/// Parse a channel id path segment.
pub(crate) fn parse_channel_id(raw: &str) -> Result<ChannelId, ApiError> {
    raw.trim()
        .parse::<ChannelId>()
        .map_err(|_| ApiError::bad_request("invalid channel id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn channel_ids_must_be_unsigned_integers() {
        assert_eq!(parse_channel_id("42").ok(), Some(42));
        for raw in ["abc", "-1", "", "1.5"] {
            let err = parse_channel_id(raw).expect_err("invalid id");
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }
}
