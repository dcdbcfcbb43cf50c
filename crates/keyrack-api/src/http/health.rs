//! Health and metrics endpoints.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::StatusCode, response::Response};
use tracing::error;

use keyrack_api_models::HealthResponse;

use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let channels = state.store.ids().await.len();
    state.telemetry.set_channels(channels);
    Json(HealthResponse {
        status: "ok".to_string(),
        channels,
    })
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    let body = state.telemetry.render().map_err(|err| {
        error!(error = %err, "failed to render metrics");
        ApiError::internal("failed to render metrics")
    })?;
    Response::builder()
        .status(StatusCode::OK)
        .header(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )
        .body(Body::from(body))
        .map_err(|err| {
            error!(error = %err, "failed to build metrics response");
            ApiError::internal("failed to build metrics response")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyrack_core::{Channel, InMemoryChannelStore};
    use keyrack_telemetry::Metrics;

    #[tokio::test]
    async fn health_reports_channel_count() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryChannelStore::with_channels([Channel::new(
            1, "solo", "sk-single",
        )]));
        let metrics = Metrics::new()?;
        let state = ApiState::new(store, metrics.clone(), None);

        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.channels, 1);
        assert_eq!(metrics.snapshot().channels, 1);
        Ok(())
    }

    #[tokio::test]
    async fn metrics_renders_text_exposition() -> anyhow::Result<()> {
        let state = ApiState::new(
            Arc::new(InMemoryChannelStore::default()),
            Metrics::new()?,
            None,
        );
        state.telemetry.inc_key_view("masked");
        let response = metrics(State(state)).await.map_err(|err| anyhow::anyhow!(err.message))?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }
}
