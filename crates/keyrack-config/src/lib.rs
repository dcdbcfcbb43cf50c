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

//! Service configuration for Keyrack.
//!
//! Configuration comes from an optional YAML document named by
//! `KEYRACK_CONFIG`, layered under `KEYRACK_*` environment overrides, and is
//! validated before the service starts. Channel seeds in the document populate
//! the in-memory channel store.

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ENV_ADMIN_TOKEN, ENV_BIND_ADDR, ENV_CONFIG_PATH, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ConfigLoader,
};
pub use model::{ChannelSeed, LogFormatSetting, LoggingSettings, ServerConfig};
pub use loader::parse_document;
pub use validate::validate;
