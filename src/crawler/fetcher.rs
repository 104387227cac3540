//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client from the transport configuration
//! - GET requests returning the page body as text
//! - Bounded retries for listing pages
//! - Error classification into [`FetchError`]

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// Certificate validation stays on unless `accept_invalid_certs` is set.
///
/// # Example
///
/// ```no_run
/// use market_harvest::config::HttpConfig;
/// use market_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    if config.accept_invalid_certs {
        tracing::warn!("TLS certificate validation is disabled");
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrieves raw markup over HTTP(S)
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    retries: u32,
    retry_delay: Duration,
}

impl PageFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, config))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, config: &HttpConfig) -> Self {
        Self {
            client,
            retries: config.page_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Fetches a URL once and returns its body
    ///
    /// Any non-success status is an error; so are timeouts and transport
    /// failures. Every error carries the URL.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })
    }

    /// Fetches a URL, retrying up to the configured number of extra attempts
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 404 | Immediate failure |
    /// | HTTP 429, 5xx | Retry after delay |
    /// | Timeout | Retry after delay |
    /// | Connection error | Retry after delay |
    pub async fn fetch_with_retry(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;

        loop {
            match self.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.retries && is_retryable(&e) => {
                    attempt += 1;
                    tracing::debug!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        self.retries + 1,
                        url,
                        e
                    );
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Maps a reqwest send error onto a fetch error for `url`
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Whether another attempt could plausibly succeed
fn is_retryable(error: &FetchError) -> bool {
    match error {
        FetchError::Status { status, .. } => *status == 429 || *status >= 500,
        FetchError::Timeout { .. } | FetchError::Transport { .. } | FetchError::Body { .. } => {
            true
        }
    }
}
