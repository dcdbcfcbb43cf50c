//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Collector registration stays private; callers only see `inc_*`/`set_*`.
//! - Key operations are labelled by outcome so rejections are visible.

use std::sync::Arc;

use prometheus::core::Collector;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

const VIEW_MODES: &[&str] = &["count", "masked"];
const KEY_MODES: &[&str] = &["random", "polling"];
const KEY_STRATEGIES: &[&str] = &["random", "sequential"];

/// Outcome label attached to key operation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Operation was applied.
    Success,
    /// Operation was rejected (bad input, missing channel, single-key channel).
    Rejected,
}

impl Outcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Rejected => "rejected",
        }
    }
}

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    key_views_total: IntCounterVec,
    key_mode_toggles_total: IntCounterVec,
    key_strategy_updates_total: IntCounterVec,
    channels: IntGauge,
}

/// Point-in-time view of the key operation counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Key views served, across modes.
    pub key_views_total: u64,
    /// Successful key mode toggles.
    pub key_mode_toggles_total: u64,
    /// Successful strategy updates.
    pub key_strategy_updates_total: u64,
    /// Channels currently stored.
    pub channels: i64,
}

impl Metrics {
    /// Construct a registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector cannot be built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = counter_vec(
            "http_requests_total",
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let key_views_total = counter_vec(
            "key_views_total",
            "Channel key views served by view mode",
            &["view_mode"],
        )?;
        let key_mode_toggles_total = counter_vec(
            "key_mode_toggles_total",
            "Key selection mode changes by resulting mode and outcome",
            &["mode", "outcome"],
        )?;
        let key_strategy_updates_total = counter_vec(
            "key_strategy_updates_total",
            "Key strategy updates by strategy and outcome",
            &["strategy", "outcome"],
        )?;
        let channels = IntGauge::with_opts(Opts::new("channels", "Channels held by the store"))
            .map_err(|source| TelemetryError::MetricsRegister {
                name: "channels",
                source,
            })?;

        register(&registry, "http_requests_total", &http_requests_total)?;
        register(&registry, "key_views_total", &key_views_total)?;
        register(&registry, "key_mode_toggles_total", &key_mode_toggles_total)?;
        register(
            &registry,
            "key_strategy_updates_total",
            &key_strategy_updates_total,
        )?;
        register(&registry, "channels", &channels)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                key_views_total,
                key_mode_toggles_total,
                key_strategy_updates_total,
                channels,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Count a served key view.
    pub fn inc_key_view(&self, view_mode: &str) {
        self.inner
            .key_views_total
            .with_label_values(&[view_mode])
            .inc();
    }

    /// Count a key mode toggle attempt.
    pub fn inc_key_mode_toggle(&self, mode: &str, outcome: Outcome) {
        self.inner
            .key_mode_toggles_total
            .with_label_values(&[mode, outcome.as_str()])
            .inc();
    }

    /// Count a strategy update attempt.
    pub fn inc_key_strategy_update(&self, strategy: &str, outcome: Outcome) {
        self.inner
            .key_strategy_updates_total
            .with_label_values(&[strategy, outcome.as_str()])
            .inc();
    }

    /// Set the stored channel gauge.
    pub fn set_channels(&self, count: usize) {
        self.inner
            .channels
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render the registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.inner.registry.gather(), &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a snapshot of the key operation counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            key_views_total: total(&self.inner.key_views_total, VIEW_MODES, None),
            key_mode_toggles_total: total(
                &self.inner.key_mode_toggles_total,
                KEY_MODES,
                Some(Outcome::Success),
            ),
            key_strategy_updates_total: total(
                &self.inner.key_strategy_updates_total,
                KEY_STRATEGIES,
                Some(Outcome::Success),
            ),
            channels: self.inner.channels.get(),
        }
    }
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}

/// Sum the series of a counter vector for the given first-label values and
/// optional outcome.
fn total(counter: &IntCounterVec, values: &[&str], outcome: Option<Outcome>) -> u64 {
    values
        .iter()
        .map(|value| match outcome {
            Some(outcome) => counter.with_label_values(&[*value, outcome.as_str()]).get(),
            None => counter.with_label_values(&[*value]).get(),
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_updates() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_http_request("/api/channel/{id}/key", 200);
        metrics.inc_key_view("masked");
        metrics.inc_key_view("count");
        metrics.inc_key_mode_toggle("polling", Outcome::Success);
        metrics.inc_key_mode_toggle("polling", Outcome::Rejected);
        metrics.inc_key_strategy_update("sequential", Outcome::Success);
        metrics.set_channels(3);

        let snapshot = metrics.snapshot();
        assert_eq!(
            snapshot,
            MetricsSnapshot {
                key_views_total: 2,
                key_mode_toggles_total: 1,
                key_strategy_updates_total: 1,
                channels: 3,
            }
        );

        let rendered = metrics.render()?;
        assert!(rendered.contains("http_requests_total"));
        assert!(rendered.contains("key_mode_toggles_total"));
        assert!(rendered.contains("outcome=\"rejected\""));
        Ok(())
    }

    #[test]
    fn registries_are_independent() -> Result<()> {
        let first = Metrics::new()?;
        let second = Metrics::new()?;
        first.inc_key_view("masked");
        assert_eq!(second.snapshot().key_views_total, 0);
        Ok(())
    }
}
