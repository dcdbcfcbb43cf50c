//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use keyrack_api_models::{
    BatchKeyStrategyResponse, ChannelId, ChannelKeyView, KeyModeResponse, KeyStrategyResponse,
};
use keyrack_console::{KeyRow, Notice, StatusInfo};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

fn print(text: &str) {
    println!("{text}");
}

pub(crate) fn format_status(
    channel_id: ChannelId,
    info: &StatusInfo,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(&json!({
            "channel_id": channel_id,
            "severity": info.severity.as_str(),
            "color": info.color().as_str(),
            "label": info.label,
            "tooltip": info.tooltip,
            "key_count": info.count_badge,
        })),
        OutputFormat::Table => {
            let badge = info
                .count_badge
                .map(|count| format!(" [{count}]"))
                .unwrap_or_default();
            Ok(format!(
                "channel {channel_id}: {} ({}){badge}\n{}",
                info.label,
                info.color().as_str(),
                info.tooltip
            ))
        }
    }
}

pub(crate) fn render_status(
    channel_id: ChannelId,
    info: &StatusInfo,
    format: OutputFormat,
) -> CliResult<()> {
    print(&format_status(channel_id, info, format)?);
    Ok(())
}

pub(crate) fn format_key_view(
    view: &ChannelKeyView,
    summary: &str,
    rows: &[KeyRow],
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(view),
        OutputFormat::Table => {
            let mut lines = vec![
                format!("channel {}: {summary}", view.channel_id),
                format!(
                    "{:>5} {:<20} {:<9} {:<19} ERROR",
                    "INDEX", "KEY", "STATUS", "LAST USED"
                ),
            ];
            for row in rows {
                lines.push(format!(
                    "{:>5} {:<20} {:<9} {:<19} {}",
                    row.index,
                    row.masked_key,
                    row.status_text,
                    row.last_used.as_deref().unwrap_or("-"),
                    row.error_message.as_deref().unwrap_or("")
                ).trim_end().to_string());
            }
            Ok(lines.join("\n"))
        }
    }
}

pub(crate) fn render_key_view(
    view: &ChannelKeyView,
    summary: &str,
    rows: &[KeyRow],
    format: OutputFormat,
) -> CliResult<()> {
    print(&format_key_view(view, summary, rows, format)?);
    Ok(())
}

pub(crate) fn render_mode_change(
    response: &KeyModeResponse,
    notice: &Notice,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print(&to_json(response)?),
        OutputFormat::Table => print(&format!("channel {}: {}", response.channel_id, notice.text)),
    }
    Ok(())
}

pub(crate) fn format_strategy(response: &KeyStrategyResponse, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(response),
        OutputFormat::Table => Ok(format!(
            "channel {}: strategy {} ({})",
            response.channel_id,
            response.polling_strategy.as_str(),
            if response.polling_enabled { "enabled" } else { "disabled" }
        )),
    }
}

pub(crate) fn render_strategy(response: &KeyStrategyResponse, format: OutputFormat) -> CliResult<()> {
    print(&format_strategy(response, format)?);
    Ok(())
}

pub(crate) fn format_batch(
    response: &BatchKeyStrategyResponse,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(response),
        OutputFormat::Table => {
            let mut text = format!(
                "updated {} channel(s): {}",
                response.updated,
                join_ids(&response.channel_ids)
            );
            if !response.skipped.is_empty() {
                text.push_str("\nskipped: ");
                text.push_str(&join_ids(&response.skipped));
            }
            Ok(text)
        }
    }
}

pub(crate) fn render_batch(
    response: &BatchKeyStrategyResponse,
    format: OutputFormat,
) -> CliResult<()> {
    print(&format_batch(response, format)?);
    Ok(())
}

fn join_ids(ids: &[ChannelId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
