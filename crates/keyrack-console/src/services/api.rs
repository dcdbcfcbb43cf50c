//! HTTP seam for the key endpoints.
//!
//! # Design
//! - Feature slices depend on the [`KeyApi`] trait, never on `reqwest`.
//! - Every failure is either a transport failure or an application
//!   rejection; callers never inspect status codes.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use keyrack_api_models::{
    ApiEnvelope, BatchKeyStrategyRequest, BatchKeyStrategyResponse, ChannelId, ChannelKeyView,
    KeyModeRequest, KeyModeResponse, KeyStrategy, KeyStrategyRequest, KeyStrategyResponse,
    ViewMode,
};

/// Failure of a console request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not produce a usable envelope.
    #[error("transport failure: {detail}")]
    Transport {
        /// Cause reported by the transport.
        detail: String,
    },
    /// The server answered with `success = false` (or omitted `success`).
    #[error("request rejected")]
    Rejected {
        /// Server message, when one was supplied.
        message: Option<String>,
    },
}

impl FetchError {
    fn transport(detail: impl ToString) -> Self {
        Self::Transport {
            detail: detail.to_string(),
        }
    }
}

/// Key endpoints consumed by the console.
#[async_trait]
pub trait KeyApi: Send + Sync {
    /// Fetch the key view of a channel.
    async fn fetch_key_view(
        &self,
        channel_id: ChannelId,
        mode: ViewMode,
    ) -> Result<ChannelKeyView, FetchError>;

    /// Switch a channel between polling (`true`) and random (`false`).
    async fn set_key_mode(
        &self,
        channel_id: ChannelId,
        enabled: bool,
    ) -> Result<KeyModeResponse, FetchError>;

    /// Configure the strategy override of a channel.
    async fn set_key_strategy(
        &self,
        channel_id: ChannelId,
        polling_enabled: bool,
        strategy: KeyStrategy,
    ) -> Result<KeyStrategyResponse, FetchError>;

    /// Configure the strategy override of several channels.
    async fn batch_key_strategy(
        &self,
        channel_ids: Vec<ChannelId>,
        polling_enabled: bool,
        strategy: KeyStrategy,
    ) -> Result<BatchKeyStrategyResponse, FetchError>;
}

/// [`KeyApi`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpKeyApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpKeyApi {
    /// Client for the service at `base_url`, optionally sending a bearer token.
    ///
    /// A trailing slash is added to the base path so relative endpoint paths
    /// resolve beneath it.
    #[must_use]
    pub fn new(client: Client, mut base_url: Url, token: Option<String>) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client,
            base_url,
            token: token.filter(|token| !token.trim().is_empty()),
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, FetchError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path).map_err(FetchError::transport)?;
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(FetchError::transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(FetchError::transport)?;
        let envelope: ApiEnvelope<T> = serde_json::from_slice(&bytes).map_err(|err| {
            if status.is_success() {
                FetchError::transport(format!("invalid response body: {err}"))
            } else {
                FetchError::transport(format!("HTTP {status}"))
            }
        })?;
        envelope
            .into_result()
            .map_err(|message| FetchError::Rejected { message })
    }
}

#[async_trait]
impl KeyApi for HttpKeyApi {
    async fn fetch_key_view(
        &self,
        channel_id: ChannelId,
        mode: ViewMode,
    ) -> Result<ChannelKeyView, FetchError> {
        let path = format!("api/channel/{channel_id}/key?view_mode={}", mode.as_str());
        self.send::<(), _>(Method::GET, &path, None).await
    }

    async fn set_key_mode(
        &self,
        channel_id: ChannelId,
        enabled: bool,
    ) -> Result<KeyModeResponse, FetchError> {
        let path = format!("api/channel/{channel_id}/key-mode");
        self.send(Method::PATCH, &path, Some(&KeyModeRequest { enabled }))
            .await
    }

    async fn set_key_strategy(
        &self,
        channel_id: ChannelId,
        polling_enabled: bool,
        strategy: KeyStrategy,
    ) -> Result<KeyStrategyResponse, FetchError> {
        let path = format!("api/channel/{channel_id}/key-strategy");
        let body = KeyStrategyRequest {
            polling_enabled,
            polling_strategy: strategy.as_str().to_string(),
        };
        self.send(Method::PUT, &path, Some(&body)).await
    }

    async fn batch_key_strategy(
        &self,
        channel_ids: Vec<ChannelId>,
        polling_enabled: bool,
        strategy: KeyStrategy,
    ) -> Result<BatchKeyStrategyResponse, FetchError> {
        let body = BatchKeyStrategyRequest {
            channel_ids,
            polling_enabled,
            polling_strategy: strategy.as_str().to_string(),
        };
        self.send(Method::PATCH, "api/channels/key-strategy", Some(&body))
            .await
    }
}
