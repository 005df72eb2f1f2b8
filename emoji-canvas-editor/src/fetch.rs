//! Background image fetch collaborator.
//!
//! The controller never sees these errors: a failed fetch is observable only
//! as "the image never arrives". The error type exists for logging and for
//! direct users of the fetcher.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// How long the production fetcher waits before giving up on a background.
/// A timeout is indistinguishable from any other silent fetch failure.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while fetching background bytes.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The background reference is not a parseable URL.
    #[error("invalid background reference: {0}")]
    InvalidReference(String),

    /// The HTTP layer failed (connection, timeout, body read).
    #[error("background request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("background request returned status {0}")]
    Status(u16),
}

/// Async byte fetch for a background reference.
///
/// Cancellation is driven externally: the controller aborts the task running
/// the fetch and discards stale completions by generation, so implementations
/// only need to be abort-safe (no cleanup obligations).
#[async_trait]
pub trait BackgroundFetcher: Send + Sync {
    /// Resolve a reference to raw image bytes.
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError>;
}

/// Production fetcher over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BackgroundFetcher for HttpFetcher {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, FetchError> {
        let url: url::Url = reference
            .parse()
            .map_err(|_| FetchError::InvalidReference(reference.to_string()))?;
        let response = self
            .client
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
