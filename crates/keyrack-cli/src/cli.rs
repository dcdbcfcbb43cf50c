//! Argument parsing and command dispatch.

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand, ValueEnum};
use keyrack_api_models::{ChannelId, KeyStrategy};
use keyrack_console::{HttpKeyApi, UnknownKeyPolicy};
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliResult, build_client, parse_url};
use crate::commands::keys::{handle_keys, handle_mode, handle_status, handle_toggle};
use crate::commands::strategy::{handle_strategy, handle_strategy_batch};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_URL: &str = "http://127.0.0.1:7878";

/// Parses CLI arguments and executes the requested command. Returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let command = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();

    match dispatch(cli, &trace_id).await {
        Ok(()) => {
            tracing::debug!(command, trace_id, "command succeeded");
            0
        }
        Err(err) => {
            let message = err.display_message();
            tracing::debug!(command, trace_id, error = %message, "command failed");
            eprintln!("error: {message}");
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let client = build_client(cli.timeout, trace_id)?;
    let ctx = AppContext {
        api: HttpKeyApi::new(client, cli.api_url, cli.token),
        output: cli.output,
        unknown_policy: cli.unknown_policy.into(),
    };

    match cli.command {
        Command::Status(args) => handle_status(&ctx, args).await,
        Command::Keys(args) => handle_keys(&ctx, args).await,
        Command::Mode(args) => handle_mode(&ctx, args).await,
        Command::Toggle(args) => handle_toggle(&ctx, args).await,
        Command::Strategy(args) => handle_strategy(&ctx, args).await,
        Command::StrategyBatch(args) => handle_strategy_batch(&ctx, args).await,
    }
}

#[derive(Parser)]
#[command(name = "keyrack", about = "Manage the upstream keys attached to relay channels")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "KEYRACK_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(long, global = true, env = "KEYRACK_TOKEN", hide_env_values = true)]
    pub(crate) token: Option<String>,
    #[arg(
        long,
        global = true,
        env = "KEYRACK_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = UnknownPolicyArg::AllDown,
        help = "How keys with unknown status count when no key is active"
    )]
    pub(crate) unknown_policy: UnknownPolicyArg,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Classify the health of a channel's keys.
    Status(ChannelArgs),
    /// Show the masked keys of a channel.
    Keys(ChannelArgs),
    /// Set the key selection mode of a multi-key channel.
    Mode(ModeArgs),
    /// Flip a multi-key channel between polling and random.
    Toggle(ChannelArgs),
    /// Configure the key strategy override of a channel.
    Strategy(StrategyArgs),
    /// Configure the key strategy override of several channels.
    StrategyBatch(StrategyBatchArgs),
}

#[derive(Args)]
pub(crate) struct ChannelArgs {
    #[arg(help = "Channel identifier")]
    pub(crate) id: ChannelId,
}

#[derive(Args)]
#[command(group(ArgGroup::new("mode").required(true).args(["polling", "random"])))]
pub(crate) struct ModeArgs {
    #[arg(help = "Channel identifier")]
    pub(crate) id: ChannelId,
    #[arg(long, help = "Select keys in order")]
    pub(crate) polling: bool,
    #[arg(long, help = "Select keys at random")]
    pub(crate) random: bool,
}

#[derive(Args)]
pub(crate) struct StrategyArgs {
    #[arg(help = "Channel identifier")]
    pub(crate) id: ChannelId,
    #[arg(long, action = ArgAction::Set, help = "Whether the strategy override is active")]
    pub(crate) enabled: bool,
    #[arg(long, value_enum)]
    pub(crate) strategy: StrategyArg,
}

#[derive(Args)]
pub(crate) struct StrategyBatchArgs {
    #[arg(long, value_delimiter = ',', required = true, help = "Comma-separated channel identifiers")]
    pub(crate) ids: Vec<ChannelId>,
    #[arg(long, action = ArgAction::Set, help = "Whether the strategy override is active")]
    pub(crate) enabled: bool,
    #[arg(long, value_enum)]
    pub(crate) strategy: StrategyArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum UnknownPolicyArg {
    AllDown,
    Partial,
}

impl From<UnknownPolicyArg> for UnknownKeyPolicy {
    fn from(value: UnknownPolicyArg) -> Self {
        match value {
            UnknownPolicyArg::AllDown => Self::AllDown,
            UnknownPolicyArg::Partial => Self::Partial,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum StrategyArg {
    Random,
    Sequential,
}

impl From<StrategyArg> for KeyStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Random => Self::Random,
            StrategyArg::Sequential => Self::Sequential,
        }
    }
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Status(_) => "status",
        Command::Keys(_) => "keys",
        Command::Mode(_) => "mode",
        Command::Toggle(_) => "toggle",
        Command::Strategy(_) => "strategy",
        Command::StrategyBatch(_) => "strategy-batch",
    }
}
