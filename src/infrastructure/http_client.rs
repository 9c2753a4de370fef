//! HTTP client for fetching listing pages with rate limiting and error handling
//!
//! Provides the page fetcher used by the crawler. Requests are throttled by a
//! shared rate limiter out of respect for the statistics site, and transient
//! failures are retried with exponential backoff. Once retries run out the
//! last error is returned and the crawl fails.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter, state::{direct::NotKeyed, InMemoryState}, clock::DefaultClock};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::infrastructure::config::defaults;

/// Transport failure while fetching a page
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Empty response from {url}")]
    EmptyBody { url: String },

    #[error("HTTP client configuration error: {0}")]
    Configuration(String),
}

impl FetchError {
    /// Network errors, timeouts, empty bodies, 408, 429 and 5xx are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { .. } | Self::EmptyBody { .. } => true,
            Self::Status { status, .. } => StatusCode::from_u16(*status).is_ok_and(|status| {
                matches!(
                    status,
                    StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
                ) || status.is_server_error()
            }),
            Self::Configuration(_) => false,
        }
    }
}

/// Fetch collaborator: absolute URL in, raw HTML text out
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_text(url).await
    }
}

/// Configuration for HTTP client behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum requests per second to avoid overwhelming the site
    pub max_requests_per_second: u32,
    /// Retries after the first failed attempt; 0 disables retrying
    pub max_retries: u32,
    /// Delay before the first retry, doubled on every further retry
    pub retry_base_delay_ms: u64,
    /// Upper bound of the random delay added to every backoff
    pub retry_jitter_ms: u64,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            max_retries: defaults::MAX_RETRIES,
            retry_base_delay_ms: defaults::RETRY_BASE_DELAY_MS,
            retry_jitter_ms: defaults::RETRY_JITTER_MS,
            follow_redirects: true,
        }
    }
}

impl HttpClientConfig {
    /// Backoff before retry number `retry` (1-based)
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let base = self.retry_base_delay_ms.saturating_mul(1_u64 << exponent);
        let jitter = if self.retry_jitter_ms > 0 {
            fastrand::u64(0..=self.retry_jitter_ms)
        } else {
            0
        };
        Duration::from_millis(base.saturating_add(jitter))
    }
}

/// HTTP client with built-in rate limiting and retries
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| FetchError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .ok_or_else(|| FetchError::Configuration("Rate limit must be greater than 0".to_string()))?,
        );

        info!(
            "🌐 HttpClient ready: {} RPS, timeout {}s, {} retries",
            config.max_requests_per_second, config.timeout_seconds, config.max_retries
        );

        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
            config,
        })
    }

    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Single attempt to fetch HTML content as string
    async fn fetch_text_once(&self, url: &str) -> Result<String, FetchError> {
        self.rate_limiter.until_ready().await;

        debug!("HTTP GET: {}", url);
        let response = self.client.get(url).send().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody { url: url.to_string() });
        }

        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let mut retry = 0;
        loop {
            match self.fetch_text_once(url).await {
                Ok(body) => {
                    if retry > 0 {
                        info!("Fetched {} after {} retries", url, retry);
                    }
                    return Ok(body);
                }
                Err(e) if e.is_retryable() && retry < self.config.max_retries => {
                    retry += 1;
                    let delay = self.config.backoff_delay(retry);
                    warn!(
                        "⚠️ Fetch failed ({}), retry {}/{} in {:?}",
                        e, retry, self.config.max_retries, delay
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
