//! HTTP client for the code host's contents endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::rate_limit::RateLimiter;
use crate::config::{FetcherConfig, API_ACCEPT_HEADER};
use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("holiday-harvester/", env!("CARGO_PKG_VERSION"));

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}

impl FileEntry {
    /// Whether the entry is a regular file (not a dir, symlink or submodule).
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.entry_type == "file"
    }
}

/// Encoded body of a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub content: String,
    pub encoding: String,
}

/// Source of directory listings and file bodies.
///
/// Lets orchestration run against a canned provider in tests.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// List the entries of a repository directory.
    async fn fetch_directory_listing(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileEntry>>;

    /// Fetch the encoded body of a repository file.
    async fn fetch_file_content(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<FileContent>;
}

/// Rate-limited client for the contents endpoint.
///
/// No retries: a non-2xx answer is returned to the caller as
/// `HarvesterError::RemoteApi`.
pub struct SourceFetcher {
    http: Client,
    config: FetcherConfig,
    limiter: Arc<RateLimiter>,
}

impl SourceFetcher {
    /// Create a fetcher with its own rate limiter.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let limiter = Arc::new(RateLimiter::new(config.request_interval));
        Self::with_limiter(config, limiter)
    }

    /// Create a fetcher drawing permits from an existing limiter.
    pub fn with_limiter(config: FetcherConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    #[must_use]
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Shared handle to this fetcher's limiter.
    #[must_use]
    pub fn limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        self.limiter.acquire(cancel).await?;

        let url = self.config.contents_url(path);
        tracing::debug!(url = %url, "requesting contents");

        let mut request = self.http.get(&url).header(ACCEPT, API_ACCEPT_HEADER);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = tokio::select! {
            biased;

            _ = cancel.cancelled() => return Err(HarvesterError::Cancelled),
            response = request.send() => response?,
        };

        let status = response.status();
        let body = tokio::select! {
            biased;

            _ = cancel.cancelled() => return Err(HarvesterError::Cancelled),
            body = response.text() => body?,
        };

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %url, "remote API error");
            return Err(HarvesterError::RemoteApi {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SourceProvider for SourceFetcher {
    async fn fetch_directory_listing(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileEntry>> {
        let entries: Vec<FileEntry> = self.get_json(path, cancel).await?;
        tracing::debug!(path, entries = entries.len(), "fetched directory listing");
        Ok(entries)
    }

    async fn fetch_file_content(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<FileContent> {
        self.get_json(path, cancel).await
    }
}
