//! Tower layers for request ids and request spans.
//!
//! # Design
//! - `x-request-id` is generated when absent and echoed on the response.
//! - Every request runs inside an `http.request` span that records status and
//!   latency once the response is produced.

use std::time::Duration;

use axum::http::{Request, Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer};
use tracing::Span;

use crate::init::build_sha;

/// Header carrying the request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Trace layer type produced by [`trace_layer`].
pub type HttpTraceLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, HttpMakeSpan, DefaultOnRequest, HttpOnResponse>;

/// Factory for the `x-request-id` generator layer.
#[must_use]
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
#[must_use]
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Trace layer opening one `http.request` span per request.
#[must_use]
pub fn trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(HttpMakeSpan)
        .on_response(HttpOnResponse)
}

/// Builds the per-request span.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpMakeSpan;

impl<B> MakeSpan<B> for HttpMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        tracing::info_span!(
            "http.request",
            method = %request.method(),
            route = %request.uri().path(),
            request_id = %request_id,
            build_sha = %build_sha(),
            status_code = tracing::field::Empty,
            latency_ms = tracing::field::Empty
        )
    }
}

/// Records status and latency on the request span.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpOnResponse;

impl<B> OnResponse<B> for HttpOnResponse {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        span.record("status_code", response.status().as_u16());
        span.record(
            "latency_ms",
            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
        );
        tracing::debug!(parent: span, "request completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_span_reads_request_id() {
        let request = Request::builder()
            .uri("/api/channel/1/key")
            .header(REQUEST_ID_HEADER, "req-1")
            .body(())
            .expect("request");
        let span = HttpMakeSpan.make_span(&request);
        let response = Response::builder().status(200).body(()).expect("response");
        HttpOnResponse.on_response(&response, Duration::from_millis(5), &span);
    }

    #[test]
    fn layers_can_be_constructed() {
        let _set = set_request_id_layer();
        let _propagate = propagate_request_id_layer();
        let _trace = trace_layer();
    }
}
