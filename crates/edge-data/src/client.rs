//! Platform fetch seam and timeout-enforcing client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use edge_core::{Request, Response};

use crate::timeout::TimeoutConfig;

/// Error type for fetch operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network unavailable: {0}")]
    Network(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether the failure means the network could not be reached in time.
    pub fn is_network_unavailable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

/// The platform's network fetch.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request against the network. HTTP error statuses are
    /// successful fetches; only transport failures are errors.
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Fetch client enforcing a total timeout on every network call.
#[derive(Clone)]
pub struct FetchClient {
    network: Arc<dyn Network>,
    timeout: TimeoutConfig,
}

impl FetchClient {
    /// Create a new fetch client.
    pub fn new(network: Arc<dyn Network>) -> Self {
        Self {
            network,
            timeout: TimeoutConfig::default(),
        }
    }

    /// Set the timeout configuration.
    pub fn with_timeout(mut self, timeout: TimeoutConfig) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch from the network, failing with [`FetchError::Timeout`] when it is too slow.
    pub async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let total = self.timeout.total;
        match tokio::time::timeout(total, self.network.fetch(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(url = %request.url, ?total, "network fetch timed out");
                Err(FetchError::Timeout(total))
            }
        }
    }

    /// Fetch and require a 2xx status.
    pub async fn fetch_ok(&self, request: &Request) -> Result<Response, FetchError> {
        let response = self.fetch(request).await?;
        if !response.is_success() {
            return Err(FetchError::Http {
                status: response.status.as_u16(),
                url: request.url.to_string(),
            });
        }
        Ok(response)
    }
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
