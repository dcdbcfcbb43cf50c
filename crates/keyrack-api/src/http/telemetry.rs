//! Request counting per matched route and status code.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::state::ApiState;

const UNMATCHED_ROUTE: &str = "unmatched";

pub(crate) async fn track_http_requests(
    State(state): State<Arc<ApiState>>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ROUTE, MatchedPath::as_str)
        .to_string();
    let response = next.run(req).await;
    state
        .telemetry
        .inc_http_request(&route, response.status().as_u16());
    response
}
