//! Toggle state machine.

use std::fmt;

use thiserror::Error;

use keyrack_api_models::{ChannelId, KeyModeConfig, KeyModeResponse, MultiKeyMode};

use crate::core::notice::Notice;
use crate::features::toggle::logic::{SINGLE_KEY_LABEL, enabled_notice};
use crate::services::api::{FetchError, KeyApi};

/// Channel key configuration held by the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleRecord {
    /// Channel the switch controls.
    pub channel_id: ChannelId,
    /// Current key configuration.
    pub key_mode: KeyModeConfig,
}

/// Request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    /// No request outstanding.
    #[default]
    Idle,
    /// Waiting for the server to confirm a switch.
    Pending {
        /// Requested polling flag.
        enabled: bool,
    },
}

/// What the front-end should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleControl {
    /// Non-interactive label.
    Fixed {
        /// Label text.
        label: &'static str,
    },
    /// Binary switch; checked means polling.
    Switch {
        /// Whether polling is active.
        checked: bool,
        /// Whether input is blocked.
        disabled: bool,
    },
}

/// Why a toggle was not started.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ToggleRejected {
    /// The channel holds a single key.
    #[error("channel has a single key")]
    SingleKey,
    /// A previous toggle is still outstanding.
    #[error("a mode change is already pending")]
    Pending,
    /// A result arrived while no mode change was outstanding.
    #[error("no mode change is pending")]
    NotPending,
}

type Listener = Box<dyn Fn(&ToggleRecord) + Send + Sync>;

/// Mode switch for one channel.
pub struct ModeToggle {
    record: ToggleRecord,
    state: ToggleState,
    listener: Option<Listener>,
}

impl fmt::Debug for ModeToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeToggle")
            .field("record", &self.record)
            .field("state", &self.state)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl ModeToggle {
    /// Switch for `record`, idle.
    #[must_use]
    pub const fn new(record: ToggleRecord) -> Self {
        Self {
            record,
            state: ToggleState::Idle,
            listener: None,
        }
    }

    /// Register a callback invoked with the updated record after each
    /// confirmed switch.
    #[must_use]
    pub fn with_listener(mut self, listener: impl Fn(&ToggleRecord) + Send + Sync + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Current record.
    #[must_use]
    pub const fn record(&self) -> &ToggleRecord {
        &self.record
    }

    /// Current request state.
    #[must_use]
    pub const fn state(&self) -> ToggleState {
        self.state
    }

    /// Control to render.
    #[must_use]
    pub const fn control(&self) -> ToggleControl {
        match self.record.key_mode {
            KeyModeConfig::SingleKey => ToggleControl::Fixed {
                label: SINGLE_KEY_LABEL,
            },
            KeyModeConfig::MultiKey { mode } => ToggleControl::Switch {
                checked: matches!(mode, MultiKeyMode::Polling),
                disabled: matches!(self.state, ToggleState::Pending { .. }),
            },
        }
    }

    /// Start a switch to the opposite mode, returning the requested polling
    /// flag.
    ///
    /// # Errors
    ///
    /// Rejects single-key channels and toggles issued while pending.
    pub fn begin(&mut self) -> Result<bool, ToggleRejected> {
        let KeyModeConfig::MultiKey { mode } = self.record.key_mode else {
            return Err(ToggleRejected::SingleKey);
        };
        if matches!(self.state, ToggleState::Pending { .. }) {
            return Err(ToggleRejected::Pending);
        }
        let enabled = mode != MultiKeyMode::Polling;
        self.state = ToggleState::Pending { enabled };
        Ok(enabled)
    }

    /// Finish the outstanding switch and produce the notice to show.
    ///
    /// # Errors
    ///
    /// Returns [`ToggleRejected::NotPending`] and leaves the record untouched
    /// when [`ModeToggle::begin`] did not start a switch.
    pub fn finish(
        &mut self,
        result: Result<KeyModeResponse, FetchError>,
    ) -> Result<Notice, ToggleRejected> {
        let ToggleState::Pending { .. } = self.state else {
            return Err(ToggleRejected::NotPending);
        };
        self.state = ToggleState::Idle;
        Ok(match result {
            Ok(response) => {
                self.record.key_mode = KeyModeConfig::MultiKey {
                    mode: response.key_mode,
                };
                tracing::info!(
                    channel_id = self.record.channel_id,
                    mode = response.key_mode.as_str(),
                    "key mode switched"
                );
                if let Some(listener) = &self.listener {
                    listener(&self.record);
                }
                Notice::success(enabled_notice(response.key_mode))
            }
            Err(err) => {
                tracing::warn!(
                    channel_id = self.record.channel_id,
                    error = %err,
                    "key mode switch failed"
                );
                Notice::from_fetch_error(&err)
            }
        })
    }

    /// Issue the switch through `api`.
    ///
    /// # Errors
    ///
    /// Returns [`ToggleRejected`] when the switch cannot start; request
    /// failures are reported through the returned notice instead.
    pub async fn toggle(&mut self, api: &dyn KeyApi) -> Result<Notice, ToggleRejected> {
        let enabled = self.begin()?;
        let result = api.set_key_mode(self.record.channel_id, enabled).await;
        self.finish(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::notice::NoticeLevel;

    fn multi(mode: MultiKeyMode) -> ToggleRecord {
        ToggleRecord {
            channel_id: 3,
            key_mode: KeyModeConfig::MultiKey { mode },
        }
    }

    fn confirmed(mode: MultiKeyMode) -> Result<KeyModeResponse, FetchError> {
        Ok(KeyModeResponse {
            channel_id: 3,
            key_mode: mode,
            enabled: mode == MultiKeyMode::Polling,
        })
    }

    #[test]
    fn single_key_channels_render_fixed_label() {
        let mut toggle = ModeToggle::new(ToggleRecord {
            channel_id: 1,
            key_mode: KeyModeConfig::SingleKey,
        });
        assert_eq!(toggle.control(), ToggleControl::Fixed { label: "single key" });
        assert_eq!(toggle.begin(), Err(ToggleRejected::SingleKey));
    }

    #[test]
    fn pending_blocks_second_toggle() {
        let mut toggle = ModeToggle::new(multi(MultiKeyMode::Random));
        assert_eq!(toggle.begin(), Ok(true));
        assert_eq!(
            toggle.control(),
            ToggleControl::Switch {
                checked: false,
                disabled: true
            }
        );
        assert_eq!(toggle.begin(), Err(ToggleRejected::Pending));
    }

    #[test]
    fn success_updates_mode_and_notifies_listener() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut toggle = ModeToggle::new(multi(MultiKeyMode::Random)).with_listener(move |record| {
            sink.lock().expect("listener lock").push(*record);
        });

        toggle.begin().expect("toggle starts");
        let notice = toggle
            .finish(confirmed(MultiKeyMode::Polling))
            .expect("switch pending");
        assert_eq!(notice, Notice::success("polling mode enabled"));
        assert_eq!(toggle.state(), ToggleState::Idle);
        assert_eq!(toggle.record().key_mode, KeyModeConfig::MultiKey { mode: MultiKeyMode::Polling });
        let seen = seen.lock().expect("listener lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].channel_id, toggle.record().channel_id);
        assert_eq!(
            seen[0].key_mode,
            KeyModeConfig::MultiKey {
                mode: MultiKeyMode::Polling
            }
        );
    }

    #[test]
    fn results_without_a_pending_switch_are_ignored() {
        let calls = Arc::new(Mutex::new(0_usize));
        let sink = Arc::clone(&calls);
        let mut single = ModeToggle::new(ToggleRecord {
            channel_id: 4,
            key_mode: KeyModeConfig::SingleKey,
        })
        .with_listener(move |_| *sink.lock().expect("listener lock") += 1);

        assert_eq!(
            single.finish(confirmed(MultiKeyMode::Polling)),
            Err(ToggleRejected::NotPending)
        );
        assert_eq!(single.record().key_mode, KeyModeConfig::SingleKey);
        assert_eq!(single.state(), ToggleState::Idle);
        assert_eq!(*calls.lock().expect("listener lock"), 0);

        let mut idle = ModeToggle::new(multi(MultiKeyMode::Random));
        assert_eq!(
            idle.finish(confirmed(MultiKeyMode::Polling)),
            Err(ToggleRejected::NotPending)
        );
        assert_eq!(
            idle.record().key_mode,
            KeyModeConfig::MultiKey {
                mode: MultiKeyMode::Random
            }
        );
    }

    #[test]
    fn failures_keep_mode_and_report_cause() {
        let mut toggle = ModeToggle::new(multi(MultiKeyMode::Polling));
        toggle.begin().expect("toggle starts");
        let notice = toggle
            .finish(Err(FetchError::Rejected {
                message: Some("channel 3 is not in multi-key mode".into()),
            }))
            .expect("switch pending");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.text, "channel 3 is not in multi-key mode");

        toggle.begin().expect("toggle starts");
        let notice = toggle
            .finish(Err(FetchError::Transport {
                detail: "timed out".into(),
            }))
            .expect("switch pending");
        assert_eq!(notice.text, "operation failed: timed out");
        assert_eq!(
            toggle.control(),
            ToggleControl::Switch {
                checked: true,
                disabled: false
            }
        );
    }
}
