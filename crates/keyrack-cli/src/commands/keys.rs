use keyrack_api_models::{KeySummary, ViewMode};
use keyrack_console::{KeyApi, KeyViewer, ModeToggle, ToggleRecord, ToggleRejected, classify};

use crate::cli::{ChannelArgs, ModeArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_key_view, render_mode_change, render_status};

pub(crate) async fn handle_status(ctx: &AppContext, args: ChannelArgs) -> CliResult<()> {
    let view = ctx.api.fetch_key_view(args.id, ViewMode::Count).await?;
    let info = classify(Some(&KeySummary::from(view)), ctx.unknown_policy);
    render_status(args.id, &info, ctx.output)
}

pub(crate) async fn handle_keys(ctx: &AppContext, args: ChannelArgs) -> CliResult<()> {
    let mut viewer = KeyViewer::new();
    let ticket = viewer.open(args.id);
    let result = ctx.api.fetch_key_view(args.id, ViewMode::Masked).await;
    viewer.apply(ticket, result.clone());
    let view = result?;
    let summary = viewer.summary_line().unwrap_or_default();
    render_key_view(&view, &summary, &viewer.rows(), ctx.output)
}

pub(crate) async fn handle_mode(ctx: &AppContext, args: ModeArgs) -> CliResult<()> {
    let current = ctx.api.fetch_key_view(args.id, ViewMode::Count).await?;
    let mut toggle = ModeToggle::new(ToggleRecord {
        channel_id: args.id,
        key_mode: current.key_mode(),
    });
    switch(ctx, &mut toggle, Some(args.polling && !args.random)).await
}

pub(crate) async fn handle_toggle(ctx: &AppContext, args: ChannelArgs) -> CliResult<()> {
    let current = ctx.api.fetch_key_view(args.id, ViewMode::Count).await?;
    let mut toggle = ModeToggle::new(ToggleRecord {
        channel_id: args.id,
        key_mode: current.key_mode(),
    });
    switch(ctx, &mut toggle, None).await
}

/// Run one guarded switch. `target` overrides the direction chosen by the
/// toggle (the opposite of the current mode).
async fn switch(ctx: &AppContext, toggle: &mut ModeToggle, target: Option<bool>) -> CliResult<()> {
    let channel_id = toggle.record().channel_id;
    let rejected = |err: ToggleRejected| match err {
        ToggleRejected::SingleKey => {
            CliError::validation(format!("channel {channel_id} holds a single key"))
        }
        ToggleRejected::Pending | ToggleRejected::NotPending => {
            CliError::validation(err.to_string())
        }
    };
    let enabled = toggle.begin().map_err(rejected)?;
    let enabled = target.unwrap_or(enabled);
    let result = ctx.api.set_key_mode(channel_id, enabled).await;
    let notice = toggle.finish(result.clone()).map_err(rejected)?;
    let response = result?;
    render_mode_change(&response, &notice, ctx.output)
}
