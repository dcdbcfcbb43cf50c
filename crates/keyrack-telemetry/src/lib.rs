#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::multiple_crate_versions)]

//! Telemetry primitives shared across the Keyrack workspace.
//!
//! Logging setup, request-id and trace layers, and the Prometheus registry
//! live here so the service binary and the HTTP router wire observability the
//! same way.

pub mod error;
pub mod init;
pub mod layers;
pub mod metrics;

pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{HttpMakeSpan, HttpOnResponse, HttpTraceLayer, REQUEST_ID_HEADER, propagate_request_id_layer, set_request_id_layer, trace_layer};
pub use metrics::{Metrics, MetricsSnapshot, Outcome};
