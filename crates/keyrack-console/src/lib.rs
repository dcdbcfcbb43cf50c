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

//! Admin console logic for channel keys.
//!
//! Three feature slices share one HTTP seam ([`services::api::KeyApi`]):
//! - `status`: classifies a key summary into a health indicator.
//! - `viewer`: fetches and renders the masked per-key view.
//! - `toggle`: drives the polling/random switch with a pending guard.
//!
//! Everything here produces plain values (labels, colors, notices, copy
//! payloads); rendering is left to the front-end hosting the logic.

pub mod core;
pub mod features;
pub mod services;

pub use crate::core::notice::{Notice, NoticeLevel};
pub use crate::core::ticket::{Generation, Ticket};
pub use features::status::logic::classify;
pub use features::status::state::{
    Color, IndicatorState, Severity, StatusIndicator, StatusInfo, UnknownKeyPolicy,
};
pub use features::toggle::state::{ModeToggle, ToggleControl, ToggleRecord, ToggleRejected, ToggleState};
pub use features::viewer::state::{KeyRow, KeyViewer, ViewerState};
pub use services::api::{FetchError, HttpKeyApi, KeyApi};
