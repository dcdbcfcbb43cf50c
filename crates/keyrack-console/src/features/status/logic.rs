//! Key summary classification.

use keyrack_api_models::{KeyStatus, KeySummary};

use crate::features::status::state::{Severity, StatusInfo, UnknownKeyPolicy};

/// Classify a key summary for display.
///
/// Rules, in order: no summary or zero keys is `None`; no active key is
/// `AllDown` (or `Partial` when the policy allows unknown keys to count);
/// any disabled key is `Partial`; otherwise `Ok`. A summary with a key count
/// but no per-key records carries no health information and is `Ok`.
#[must_use]
pub fn classify(summary: Option<&KeySummary>, policy: UnknownKeyPolicy) -> StatusInfo {
    let Some(summary) = summary.filter(|summary| summary.key_count > 0) else {
        return StatusInfo {
            severity: Severity::None,
            label: "not configured".to_string(),
            tooltip: "no keys configured".to_string(),
            count_badge: None,
        };
    };

    let key_count = summary.key_count;
    let count_badge = (key_count > 1).then_some(key_count);
    if summary.keys.is_empty() {
        return healthy(key_count, count_badge);
    }

    let count = |status: KeyStatus| {
        summary
            .keys
            .iter()
            .filter(|key| key.status == status)
            .count()
    };
    let active = count(KeyStatus::Active);
    let disabled = count(KeyStatus::Disabled);
    let unknown = count(KeyStatus::Unknown);

    if active == 0 {
        if policy == UnknownKeyPolicy::Partial && unknown > 0 {
            return StatusInfo {
                severity: Severity::Partial,
                label: "partially available".to_string(),
                tooltip: format!("0 active, {disabled} disabled, {unknown} unknown"),
                count_badge,
            };
        }
        return StatusInfo {
            severity: Severity::AllDown,
            label: "all keys down".to_string(),
            tooltip: if key_count == 1 {
                "the key is unavailable".to_string()
            } else {
                format!("all {key_count} keys are unavailable")
            },
            count_badge,
        };
    }

    if disabled > 0 {
        return StatusInfo {
            severity: Severity::Partial,
            label: "partially available".to_string(),
            tooltip: format!("{active} active, {disabled} disabled"),
            count_badge,
        };
    }

    healthy(key_count, count_badge)
}

fn healthy(key_count: usize, count_badge: Option<usize>) -> StatusInfo {
    if key_count == 1 {
        StatusInfo {
            severity: Severity::Ok,
            label: "normal".to_string(),
            tooltip: "the key is working normally".to_string(),
            count_badge,
        }
    } else {
        StatusInfo {
            severity: Severity::Ok,
            label: "all normal".to_string(),
            tooltip: format!("all {key_count} keys are working normally"),
            count_badge,
        }
    }
}

/// Display information for a failed status fetch.
pub(crate) fn unavailable() -> StatusInfo {
    StatusInfo {
        severity: Severity::Unavailable,
        label: "status unavailable".to_string(),
        tooltip: "key status could not be loaded".to_string(),
        count_badge: None,
    }
}
