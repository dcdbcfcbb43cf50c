//! Channel key view and key selection handlers.
//!
//! # Design
//! - Path ids, query strings and JSON bodies are parsed by hand so failures
//!   still produce envelopes instead of extractor plain-text rejections.
//! - Every mode or strategy change logs the channel id and outcome.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use tracing::{info, warn};

use keyrack_api_models::{
    ApiEnvelope, BatchKeyStrategyRequest, BatchKeyStrategyResponse, ChannelKeyView,
    KeyModeRequest, KeyModeResponse, KeyStrategyRequest, KeyStrategyResponse, KeyViewQuery,
};
use keyrack_core::{ChannelId, KeyStrategy, MultiKeyMode, ViewMode, channel_key_view};
use keyrack_telemetry::Outcome;

use crate::http::errors::ApiError;
use crate::http::parse_channel_id;
use crate::state::ApiState;

type Envelope<T> = Json<ApiEnvelope<T>>;

/// Upper bound on distinct channel ids accepted by one batch update.
pub(crate) const MAX_BATCH_CHANNELS: usize = 1_000;

pub(crate) async fn get_channel_key(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<KeyViewQuery>, QueryRejection>,
) -> Result<Envelope<ChannelKeyView>, ApiError> {
    let Path(raw_id) = path?;
    let channel_id = parse_channel_id(&raw_id)?;
    let Query(query) = query?;
    let mode = match query.view_mode.as_deref().map(str::trim) {
        None | Some("") => ViewMode::default(),
        Some(value) => value.parse::<ViewMode>()?,
    };
    let channel = state.store.get(channel_id).await?;
    state.telemetry.inc_key_view(mode.as_str());
    Ok(Json(ApiEnvelope::ok(channel_key_view(&channel, mode))))
}

pub(crate) async fn toggle_key_mode(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<KeyModeRequest>, JsonRejection>,
) -> Result<Envelope<KeyModeResponse>, ApiError> {
    let Path(raw_id) = path?;
    let channel_id = parse_channel_id(&raw_id)?;
    let Json(request) = body?;
    let requested = MultiKeyMode::from_polling(request.enabled);

    match state.store.set_polling(channel_id, request.enabled).await {
        Ok(key_mode) => {
            state
                .telemetry
                .inc_key_mode_toggle(key_mode.as_str(), Outcome::Success);
            info!(channel_id, key_mode = key_mode.as_str(), "key mode updated");
            Ok(Json(ApiEnvelope::ok(KeyModeResponse {
                channel_id,
                key_mode,
                enabled: request.enabled,
            })))
        }
        Err(err) => {
            state
                .telemetry
                .inc_key_mode_toggle(requested.as_str(), Outcome::Rejected);
            warn!(channel_id, error = %err, "key mode update rejected");
            Err(err.into())
        }
    }
}

pub(crate) async fn update_key_strategy(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<KeyStrategyRequest>, JsonRejection>,
) -> Result<Envelope<KeyStrategyResponse>, ApiError> {
    let Path(raw_id) = path?;
    let channel_id = parse_channel_id(&raw_id)?;
    let Json(request) = body?;
    let strategy = parse_strategy(&state, &request.polling_strategy)?;

    match state
        .store
        .set_key_strategy(channel_id, request.polling_enabled, strategy)
        .await
    {
        Ok(()) => {
            state
                .telemetry
                .inc_key_strategy_update(strategy.as_str(), Outcome::Success);
            info!(
                channel_id,
                polling_enabled = request.polling_enabled,
                polling_strategy = strategy.as_str(),
                "key strategy updated"
            );
            Ok(Json(ApiEnvelope::ok(KeyStrategyResponse {
                channel_id,
                polling_enabled: request.polling_enabled,
                polling_strategy: strategy,
            })))
        }
        Err(err) => {
            state
                .telemetry
                .inc_key_strategy_update(strategy.as_str(), Outcome::Rejected);
            warn!(channel_id, error = %err, "key strategy update rejected");
            Err(err.into())
        }
    }
}

pub(crate) async fn batch_update_key_strategy(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<BatchKeyStrategyRequest>, JsonRejection>,
) -> Result<Envelope<BatchKeyStrategyResponse>, ApiError> {
    let Json(request) = body?;
    if request.channel_ids.is_empty() {
        return Err(ApiError::rejected("channel_ids must not be empty"));
    }
    let mut seen = BTreeSet::new();
    let channel_ids: Vec<ChannelId> = request
        .channel_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();
    if channel_ids.len() > MAX_BATCH_CHANNELS {
        warn!(requested = channel_ids.len(), "batch key strategy list too long");
        return Err(ApiError::rejected(format!(
            "channel_ids must not exceed {MAX_BATCH_CHANNELS} entries"
        )));
    }
    let strategy = parse_strategy(&state, &request.polling_strategy)?;

    let outcomes = state
        .store
        .set_key_strategy_many(&channel_ids, request.polling_enabled, strategy)
        .await;
    let mut response = BatchKeyStrategyResponse::default();
    for (channel_id, outcome) in outcomes {
        match outcome {
            Ok(()) => {
                state
                    .telemetry
                    .inc_key_strategy_update(strategy.as_str(), Outcome::Success);
                response.channel_ids.push(channel_id);
            }
            Err(err) => {
                state
                    .telemetry
                    .inc_key_strategy_update(strategy.as_str(), Outcome::Rejected);
                warn!(channel_id, error = %err, "batch key strategy update skipped channel");
                response.skipped.push(channel_id);
            }
        }
    }
    response.updated = response.channel_ids.len();
    info!(
        updated = response.updated,
        skipped = response.skipped.len(),
        polling_enabled = request.polling_enabled,
        polling_strategy = strategy.as_str(),
        "batch key strategy applied"
    );

    let message = (!response.skipped.is_empty())
        .then(|| format!("{} channel(s) skipped", response.skipped.len()));
    Ok(Json(ApiEnvelope {
        message,
        ..ApiEnvelope::ok(response)
    }))
}

fn parse_strategy(state: &ApiState, raw: &str) -> Result<KeyStrategy, ApiError> {
    raw.trim().parse::<KeyStrategy>().map_err(|err| {
        state
            .telemetry
            .inc_key_strategy_update("invalid", Outcome::Rejected);
        warn!(value = raw, "unknown key strategy requested");
        ApiError::from(err)
    })
}
