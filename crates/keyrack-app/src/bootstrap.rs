use std::net::SocketAddr;
use std::sync::Arc;

use keyrack_api::{ApiServer, ApiState};
use keyrack_config::{ChannelSeed, ConfigLoader, LogFormatSetting, ServerConfig};
use keyrack_core::InMemoryChannelStore;
use keyrack_telemetry::{LogFormat, LoggingConfig, Metrics};
use tracing::info;

use crate::error::{AppError, AppResult};

/// Dependencies required to bootstrap the service.
pub struct BootstrapDependencies {
    config: ServerConfig,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Load configuration through `loader` and build the metrics registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or validated, or
    /// if the metrics registry cannot be built.
    pub fn from_loader(loader: &ConfigLoader) -> AppResult<Self> {
        let config = loader
            .load()
            .map_err(|err| AppError::config("config_loader.load", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self { config, telemetry })
    }

    /// Loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Entry point for the Keyrack boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, logging or the API listener fail.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_loader(&ConfigLoader::from_env())?;
    let logging = dependencies.config.logging.clone();
    keyrack_telemetry::init_logging(&LoggingConfig {
        level: &logging.level,
        format: log_format(logging.format),
        ..LoggingConfig::default()
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    run_app_with(dependencies).await
}

/// Boot sequence that relies entirely on injected dependencies.
///
/// # Errors
///
/// Returns an error if the exposure guard refuses the bind address or the
/// API listener fails.
pub async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies { config, telemetry } = dependencies;
    info!("keyrack bootstrap starting");

    enforce_exposure_guard(config.bind_addr, config.admin_token.as_deref())?;

    let store = build_store(config.channels);
    telemetry.set_channels(store.len().await);
    info!(channels = store.len().await, "channel store ready");

    let state = ApiState::new(Arc::new(store), telemetry, config.admin_token);
    let api = ApiServer::new(state);

    info!(addr = %config.bind_addr, "launching API listener");
    api.serve(config.bind_addr)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("API server shutdown complete");
    Ok(())
}

/// Seed the in-memory store from configuration.
pub(crate) fn build_store(seeds: Vec<ChannelSeed>) -> InMemoryChannelStore {
    InMemoryChannelStore::with_channels(seeds.into_iter().map(ChannelSeed::into_channel))
}

/// Map the configured log format, inferring it from the build profile when
/// unset.
pub(crate) const fn log_format(setting: Option<LogFormatSetting>) -> LogFormat {
    match setting {
        Some(LogFormatSetting::Json) => LogFormat::Json,
        Some(LogFormatSetting::Pretty) => LogFormat::Pretty,
        None => LogFormat::infer(),
    }
}

/// Refuse to expose the key endpoints beyond loopback without an admin token.
pub(crate) fn enforce_exposure_guard(addr: SocketAddr, admin_token: Option<&str>) -> AppResult<()> {
    if addr.ip().is_loopback() || admin_token.is_some_and(|token| !token.is_empty()) {
        return Ok(());
    }
    tracing::error!(%addr, "refusing non-loopback bind without an admin token");
    Err(AppError::InvalidConfig {
        field: "admin_token",
        reason: "required_for_non_loopback_bind",
        value: Some(addr.to_string()),
    })
}
