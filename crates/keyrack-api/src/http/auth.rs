//! Bearer token guard for `/api` routes.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::http::errors::ApiError;
use crate::state::ApiState;

const BEARER_PREFIX: &str = "Bearer ";

pub(crate) async fn require_admin_token(
    State(state): State<Arc<ApiState>>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let presented = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim);

    match presented {
        Some(token) if tokens_match(token, expected) => Ok(next.run(req).await),
        Some(_) => {
            warn!(path = %req.uri().path(), "rejected request with invalid admin token");
            Err(ApiError::unauthorized("invalid admin token"))
        }
        None => Err(ApiError::unauthorized("missing admin token")),
    }
}

/// Compare tokens without short-circuiting on the first differing byte.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let presented = presented.as_bytes();
    let expected = expected.as_bytes();
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0_u8, |acc, (left, right)| acc | (left ^ right))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_comparison() {
        assert!(tokens_match("secret-token", "secret-token"));
        assert!(!tokens_match("secret-token", "secret-tokem"));
        assert!(!tokens_match("short", "secret-token"));
    }
}
