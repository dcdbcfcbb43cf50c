//! Router assembly and server bootstrap.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header::AUTHORIZATION, header::CONTENT_TYPE},
    middleware,
    routing::{get, patch, put},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::auth::require_admin_token;
use crate::http::health::{health, metrics};
use crate::http::keys::{
    batch_update_key_strategy, get_channel_key, toggle_key_mode, update_key_strategy,
};
use crate::http::telemetry::track_http_requests;
use crate::state::ApiState;

/// Axum router wrapper hosting the Keyrack API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Build the router with auth, CORS, request-id, trace and metrics layers.
    #[must_use]
    pub fn new(state: Arc<ApiState>) -> Self {
        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::PUT, Method::PATCH, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION]);
        let layered = ServiceBuilder::new()
            .layer(keyrack_telemetry::set_request_id_layer())
            .layer(keyrack_telemetry::propagate_request_id_layer())
            .layer(keyrack_telemetry::trace_layer())
            .layer(cors_layer);

        let router = Self::public_routes()
            .merge(Self::api_routes(&state))
            .route_layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                track_http_requests,
            ))
            .layer(layered)
            .with_state(state);

        Self { router }
    }

    fn public_routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics))
    }

    fn api_routes(state: &Arc<ApiState>) -> Router<Arc<ApiState>> {
        Router::new()
            .route("/api/channel/{id}/key", get(get_channel_key))
            .route("/api/channel/{id}/key-mode", patch(toggle_key_mode))
            .route("/api/channel/{id}/key-strategy", put(update_key_strategy))
            .route(
                "/api/channels/key-strategy",
                patch(batch_update_key_strategy),
            )
            .route_layer(middleware::from_fn_with_state(
                Arc::clone(state),
                require_admin_token,
            ))
    }

    /// Router for embedding or in-process testing.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind to `addr` and serve until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn serve(self, addr: SocketAddr) -> ApiServerResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        tracing::info!(%addr, "keyrack api listening");
        axum::serve(listener, self.router.into_make_service())
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }
}
