use std::collections::BTreeSet;

use keyrack_api_models::KeyStrategy;
use keyrack_console::KeyApi;

use crate::cli::{StrategyArgs, StrategyBatchArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_batch, render_strategy};

pub(crate) async fn handle_strategy(ctx: &AppContext, args: StrategyArgs) -> CliResult<()> {
    let strategy = KeyStrategy::from(args.strategy);
    let response = ctx
        .api
        .set_key_strategy(args.id, args.enabled, strategy)
        .await?;
    tracing::debug!(
        channel_id = args.id,
        strategy = strategy.as_str(),
        "key strategy updated"
    );
    render_strategy(&response, ctx.output)
}

pub(crate) async fn handle_strategy_batch(
    ctx: &AppContext,
    args: StrategyBatchArgs,
) -> CliResult<()> {
    let ids: Vec<_> = args
        .ids
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if ids.is_empty() {
        return Err(CliError::validation("at least one channel id is required"));
    }
    let response = ctx
        .api
        .batch_key_strategy(ids, args.enabled, args.strategy.into())
        .await?;
    render_batch(&response, ctx.output)
}
