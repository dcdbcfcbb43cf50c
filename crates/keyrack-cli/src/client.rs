//! HTTP client construction and CLI error types.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use keyrack_console::{FetchError, HttpKeyApi, UnknownKeyPolicy};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

use crate::cli::OutputFormat;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<FetchError> for CliError {
    /// Server rejections are reported as validation failures (the request was
    /// understood and refused); everything else is operational.
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Rejected { message } => {
                Self::validation(message.unwrap_or_else(|| "operation failed".to_string()))
            }
            FetchError::Transport { detail } => Self::failure(anyhow!("request failed: {detail}")),
        }
    }
}

/// Build the HTTP client used for every command.
pub(crate) fn build_client(timeout_secs: u64, trace_id: &str) -> CliResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(trace_id)
        .map_err(|_| CliError::failure(anyhow!("trace identifier contains invalid characters")))?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);

    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .default_headers(default_headers)
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) api: HttpKeyApi,
    pub(crate) output: OutputFormat,
    pub(crate) unknown_policy: UnknownKeyPolicy,
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}
