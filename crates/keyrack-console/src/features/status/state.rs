//! Indicator display state.

use keyrack_api_models::{ChannelId, KeySummary, ViewMode};

use crate::core::ticket::{Generation, Ticket};
use crate::features::status::logic::{classify, unavailable};
use crate::services::api::{FetchError, KeyApi};

/// Health bucket of a key collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// No keys configured.
    None,
    /// No key is active.
    AllDown,
    /// Some keys are disabled.
    Partial,
    /// Every key is active.
    Ok,
    /// Key status could not be fetched.
    Unavailable,
}

impl Severity {
    /// Lowercase severity name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::AllDown => "all_down",
            Self::Partial => "partial",
            Self::Ok => "ok",
            Self::Unavailable => "unavailable",
        }
    }

    /// Display color for the severity.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::None | Self::Unavailable => Color::Grey,
            Self::AllDown => Color::Red,
            Self::Partial => Color::Orange,
            Self::Ok => Color::Green,
        }
    }
}

/// Indicator colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Neutral.
    Grey,
    /// Failure.
    Red,
    /// Degraded.
    Orange,
    /// Healthy.
    Green,
}

impl Color {
    /// Lowercase color name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grey => "grey",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Green => "green",
        }
    }
}

/// How keys with `unknown` status count when no key is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeyPolicy {
    /// Unknown keys count as disabled, so the set is `all_down`.
    #[default]
    AllDown,
    /// Unknown keys may still work, so the set is `partial`.
    Partial,
}

/// Classified display information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    /// Health bucket.
    pub severity: Severity,
    /// Short label.
    pub label: String,
    /// Longer explanation for a tooltip.
    pub tooltip: String,
    /// Key count badge, shown only for multi-key collections.
    pub count_badge: Option<usize>,
}

impl StatusInfo {
    /// Display color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.severity.color()
    }
}

/// Indicator lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndicatorState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Fetch outstanding.
    Loading,
    /// Classified result.
    Ready(StatusInfo),
}

/// Status indicator for one channel.
#[derive(Debug, Default)]
pub struct StatusIndicator {
    policy: UnknownKeyPolicy,
    generation: Generation,
    state: IndicatorState,
}

impl StatusIndicator {
    /// Indicator using `policy` for unknown keys.
    #[must_use]
    pub fn new(policy: UnknownKeyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Current display state.
    #[must_use]
    pub const fn state(&self) -> &IndicatorState {
        &self.state
    }

    /// Mark a fetch as started.
    pub fn begin(&mut self) -> Ticket {
        self.state = IndicatorState::Loading;
        self.generation.next()
    }

    /// Apply a fetch result. Returns `false` when the ticket is stale.
    pub fn apply(
        &mut self,
        ticket: Ticket,
        channel_id: ChannelId,
        result: Result<KeySummary, FetchError>,
    ) -> bool {
        if !self.generation.is_current(ticket) {
            tracing::debug!(channel_id, "discarding stale key status response");
            return false;
        }
        let info = match result {
            Ok(summary) => classify(Some(&summary), self.policy),
            Err(err) => {
                tracing::warn!(channel_id, error = %err, "failed to fetch key status");
                unavailable()
            }
        };
        self.state = IndicatorState::Ready(info);
        true
    }

    /// Fetch the count view and classify it.
    pub async fn refresh(&mut self, api: &dyn KeyApi, channel_id: ChannelId) -> &IndicatorState {
        let ticket = self.begin();
        let result = api
            .fetch_key_view(channel_id, ViewMode::Count)
            .await
            .map(KeySummary::from);
        self.apply(ticket, channel_id, result);
        &self.state
    }

    /// Drop the displayed state and ignore outstanding responses.
    pub fn reset(&mut self) {
        self.generation.invalidate();
        self.state = IndicatorState::Idle;
    }
}
