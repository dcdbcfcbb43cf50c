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
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! HTTP surface for channel key views and key selection settings.
//!
//! Every `/api` response uses the `{success, data, message}` envelope from
//! `keyrack-api-models`. Malformed channel ids and bodies are HTTP 400,
//! missing or wrong admin tokens are HTTP 401, and domain rejections are
//! HTTP 200 with `success = false`.

pub mod error;
pub(crate) mod http;
pub mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
pub use state::ApiState;
