//! Configuration loading from YAML and `KEYRACK_*` environment variables.
//!
//! # Design
//! - Environment access goes through a lookup closure so tests never touch
//!   the process environment.
//! - Overrides are applied after the document is parsed and before validation.

use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::model::{LogFormatSetting, ServerConfig};
use crate::validate::validate;

/// Path to the YAML configuration document.
pub const ENV_CONFIG_PATH: &str = "KEYRACK_CONFIG";
/// Bind address override.
pub const ENV_BIND_ADDR: &str = "KEYRACK_BIND_ADDR";
/// Admin bearer token override; an empty value disables the guard.
pub const ENV_ADMIN_TOKEN: &str = "KEYRACK_ADMIN_TOKEN";
/// Log level override.
pub const ENV_LOG_LEVEL: &str = "KEYRACK_LOG_LEVEL";
/// Log format override (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "KEYRACK_LOG_FORMAT";

const OVERRIDE_VARS: [&str; 4] = [ENV_BIND_ADDR, ENV_ADMIN_TOKEN, ENV_LOG_LEVEL, ENV_LOG_FORMAT];

/// Loads and validates [`ServerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    overrides: BTreeMap<&'static str, String>,
}

impl ConfigLoader {
    /// Loader reading the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loader reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = lookup(ENV_CONFIG_PATH)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let overrides = OVERRIDE_VARS
            .into_iter()
            .filter_map(|name| lookup(name).map(|value| (name, value)))
            .collect();
        Self { path, overrides }
    }

    /// Replace the document path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Document path in use, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the document, apply overrides and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed, when an
    /// override is malformed, or when validation fails.
    pub fn load(&self) -> ConfigResult<ServerConfig> {
        let mut config = match &self.path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                parse_document(&text, Some(path))?
            }
            None => ServerConfig::default(),
        };
        self.apply_overrides(&mut config)?;
        validate(&config)?;
        tracing::debug!(
            path = ?self.path,
            bind_addr = %config.bind_addr,
            channels = config.channels.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut ServerConfig) -> ConfigResult<()> {
        if let Some(value) = self.overrides.get(ENV_BIND_ADDR) {
            config.bind_addr = value.trim().parse::<SocketAddr>().map_err(|_| {
                ConfigError::invalid(
                    "server",
                    "bind_addr",
                    Some(value.clone()),
                    "not a socket address",
                )
            })?;
        }
        if let Some(value) = self.overrides.get(ENV_ADMIN_TOKEN) {
            let token = value.trim();
            config.admin_token = (!token.is_empty()).then(|| token.to_string());
        }
        if let Some(value) = self.overrides.get(ENV_LOG_LEVEL) {
            config.logging.level = value.trim().to_string();
        }
        if let Some(value) = self.overrides.get(ENV_LOG_FORMAT) {
            config.logging.format = Some(parse_log_format(value)?);
        }
        Ok(())
    }
}

/// Parse a YAML configuration document.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the document does not match the
/// expected shape.
pub fn parse_document(text: &str, path: Option<&Path>) -> ConfigResult<ServerConfig> {
    if text.trim().is_empty() {
        return Ok(ServerConfig::default());
    }
    serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.map(Path::to_path_buf),
        source,
    })
}

fn parse_log_format(value: &str) -> ConfigResult<LogFormatSetting> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(LogFormatSetting::Json),
        "pretty" | "text" => Ok(LogFormatSetting::Pretty),
        _ => Err(ConfigError::invalid(
            "logging",
            "format",
            Some(value.to_string()),
            "expected json or pretty",
        )),
    }
}
