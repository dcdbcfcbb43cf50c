//! Viewer lifecycle and rows.

use keyrack_api_models::{ChannelId, ChannelKeyView, KeyRecord, ViewMode};

use crate::core::notice::Notice;
use crate::core::ticket::{Generation, Ticket};
use crate::features::status::state::Color;
use crate::features::viewer::logic::{copy_payload, key_type_text, mode_text, status_badge};
use crate::services::api::{FetchError, KeyApi};

/// Viewer lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewerState {
    /// Not showing any channel.
    #[default]
    Closed,
    /// Fetch outstanding for the channel.
    Loading {
        /// Channel being fetched.
        channel_id: ChannelId,
    },
    /// Masked view loaded.
    Loaded(ChannelKeyView),
    /// Fetch failed; nothing is displayed.
    Failed {
        /// Channel that failed to load.
        channel_id: ChannelId,
        /// Notice describing the failure.
        notice: Notice,
    },
}

/// One rendered key line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRow {
    /// Position in the channel key list.
    pub index: usize,
    /// Masked key text.
    pub masked_key: String,
    /// Status label.
    pub status_text: &'static str,
    /// Status color.
    pub status_color: Color,
    /// Last-used time, when known.
    pub last_used: Option<String>,
    /// Error attached to the key, when any.
    pub error_message: Option<String>,
    /// Text the copy action places on the clipboard.
    pub copy_text: String,
}

impl From<&KeyRecord> for KeyRow {
    fn from(record: &KeyRecord) -> Self {
        let (status_text, status_color) = status_badge(record.status);
        Self {
            index: record.index,
            masked_key: record.masked_key.clone(),
            status_text,
            status_color,
            last_used: record.last_used.clone(),
            error_message: record.error_message.clone(),
            copy_text: copy_payload(record).to_string(),
        }
    }
}

/// Masked key detail viewer for one channel at a time.
#[derive(Debug, Default)]
pub struct KeyViewer {
    generation: Generation,
    state: ViewerState,
}

impl KeyViewer {
    /// Closed viewer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Open the viewer for `channel_id`, dropping anything shown before.
    pub fn open(&mut self, channel_id: ChannelId) -> Ticket {
        self.state = ViewerState::Loading { channel_id };
        self.generation.next()
    }

    /// Apply a fetch result. Returns `false` when the ticket is stale.
    pub fn apply(&mut self, ticket: Ticket, result: Result<ChannelKeyView, FetchError>) -> bool {
        if !self.generation.is_current(ticket) {
            tracing::debug!("discarding stale key view response");
            return false;
        }
        let ViewerState::Loading { channel_id } = self.state else {
            return false;
        };
        self.state = match result {
            Ok(view) => ViewerState::Loaded(view),
            Err(err) => {
                tracing::warn!(channel_id, error = %err, "failed to load key details");
                ViewerState::Failed {
                    channel_id,
                    notice: Notice::from_fetch_error(&err),
                }
            }
        };
        true
    }

    /// Open the viewer and load the masked view.
    pub async fn load(&mut self, api: &dyn KeyApi, channel_id: ChannelId) -> &ViewerState {
        let ticket = self.open(channel_id);
        let result = api.fetch_key_view(channel_id, ViewMode::Masked).await;
        self.apply(ticket, result);
        &self.state
    }

    /// Close the viewer, clearing all key data.
    pub fn close(&mut self) {
        self.generation.invalidate();
        self.state = ViewerState::Closed;
    }

    /// Loaded view, if any.
    #[must_use]
    pub const fn view(&self) -> Option<&ChannelKeyView> {
        match &self.state {
            ViewerState::Loaded(view) => Some(view),
            _ => None,
        }
    }

    /// Failure notice, if the last fetch failed.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        match &self.state {
            ViewerState::Failed { notice, .. } => Some(notice),
            _ => None,
        }
    }

    /// Rendered key rows; empty unless a view is loaded.
    #[must_use]
    pub fn rows(&self) -> Vec<KeyRow> {
        self.view()
            .map(|view| view.keys.iter().map(KeyRow::from).collect())
            .unwrap_or_default()
    }

    /// Header line: key type and selection mode.
    #[must_use]
    pub fn summary_line(&self) -> Option<String> {
        self.view().map(|view| {
            format!(
                "{} keys, {}, {}",
                view.key_count,
                key_type_text(view.key_type),
                mode_text(view.key_mode())
            )
        })
    }
}
