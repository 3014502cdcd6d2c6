//! HTTP fetcher with bounded retry
//!
//! All network reads in the harvester go through [`Fetcher::fetch`], which
//! layers three behaviors over a plain GET:
//! - the rate limiter runs before every attempt, retries included
//! - transient failures (non-2xx, connection errors, timeouts) are retried
//!   up to [`MAX_ATTEMPTS`] with exponential backoff
//! - exhaustion is reported as a typed error naming the URL and last cause,
//!   which callers treat as an item-level failure, never a crash

use crate::fetch::backoff::{next_delay, MAX_ATTEMPTS};
use crate::fetch::limiter::RateLimiter;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by the fetch layer
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetch failed for {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: String,
    },
}

/// Builds the HTTP client used for all requests
///
/// Follows redirects (archive pages redirect freely between listing styles)
/// and applies the request timeout the whole retry policy is built around.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// GET with rate limiting and bounded retry
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    limiter: RateLimiter,
    max_attempts: u32,
}

impl Fetcher {
    /// Creates a fetcher enforcing the given minimum request interval
    pub fn new(client: Client, min_interval: Duration) -> Self {
        Self {
            client,
            limiter: RateLimiter::new(min_interval),
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Fetches a URL, returning the response body bytes.
    ///
    /// Retries transient failures with exponential backoff. After the attempt
    /// ceiling is exhausted returns [`FetchError::Exhausted`]; the caller
    /// decides whether to skip the item or abort.
    pub async fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut last_error: Option<FetchError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = next_delay(attempt - 1);
                tracing::debug!(%url, attempt, ?delay, "Backing off before retry");
                tokio::time::sleep(delay).await;
            }

            // The politeness floor applies to every attempt so retries do not
            // raise the aggregate request rate.
            self.limiter.wait().await;

            match self.try_fetch(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    tracing::warn!(
                        %url,
                        attempt = attempt + 1,
                        max = self.max_attempts,
                        error = %e,
                        "Fetch attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    /// Fetches a URL and decodes the body as UTF-8 text.
    ///
    /// The archive serves UTF-8; stray invalid sequences are replaced rather
    /// than failing the page.
    pub async fn fetch_text(&mut self, url: &str) -> Result<String, FetchError> {
        let bytes = self.fetch(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        Ok(bytes.to_vec())
    }
}
