//! Shared state handed to every handler.

use std::sync::Arc;

use keyrack_core::ChannelStore;
use keyrack_telemetry::Metrics;

/// Dependencies shared by the HTTP handlers.
pub struct ApiState {
    pub(crate) store: Arc<dyn ChannelStore>,
    pub(crate) telemetry: Metrics,
    pub(crate) admin_token: Option<String>,
}

impl ApiState {
    /// Bundle the store, metrics and optional admin token.
    #[must_use]
    pub fn new(
        store: Arc<dyn ChannelStore>,
        telemetry: Metrics,
        admin_token: Option<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            telemetry,
            admin_token: admin_token.filter(|token| !token.is_empty()),
        })
    }

    /// Whether `/api` routes require a bearer token.
    #[must_use]
    pub const fn requires_token(&self) -> bool {
        self.admin_token.is_some()
    }
}
