#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! Channel key domain: parsing, masking, status derivation, key selection
//! and the in-memory channel store shared by the HTTP service.

pub mod error;
pub mod keys;
pub mod model;
pub mod selection;
pub mod store;
pub mod view;

pub use error::{KeyError, KeyResult};
pub use keys::{detect_key_type, mask_key, parse_keys};
pub use model::{
    Channel, ChannelId, ChannelInfo, ChannelStatus, KeyModeConfig, KeyStatus, KeyStrategy,
    KeyType, MultiKeyMode, ViewMode, apply_default_polling_strategy,
};
pub use selection::{SelectedKey, SelectionStrategy};
pub use store::{ChannelStore, InMemoryChannelStore};
pub use view::{ChannelKeyView, KeyRecord, LAST_USED_FORMAT, channel_key_view};
