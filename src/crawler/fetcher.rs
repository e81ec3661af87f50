//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building one shared client with browser-like default headers
//! - Per-attempt timeouts
//! - Retry with exponential backoff and jitter for transient failures
//! - Error classification

use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, UPGRADE_INSECURE_REQUESTS,
};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Upper bound (exclusive) of the random jitter added to each backoff
const JITTER_MS: u64 = 200;

/// Error surfaced once a fetch has definitively failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out after {attempts} attempt(s)")]
    Timeout { url: String, attempts: u32 },

    #[error("Request to {url} failed after {attempts} attempt(s): {message}")]
    Transport {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}

/// Timeout and retry budget for one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Hard cap on a single attempt, from connect through body read
    pub timeout: Duration,

    /// Attempts made after the first one fails
    pub max_retries: u32,

    /// Delay before the first retry; doubled for each further retry
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(timeout_ms: u64, max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            max_retries,
            backoff_base: Duration::from_millis(backoff_base_ms),
        }
    }

    /// Total number of attempts allowed
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff before the retry that follows failed attempt `attempt` (1-based),
    /// without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1u32 << exponent)
    }
}

/// Response of one attempt that reached the server
enum Attempt {
    Body(String),
    Status(u16),
}

/// Retryable failure of one attempt
enum AttemptFailure {
    Timeout,
    Transport(String),
}

impl AttemptFailure {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Builds the shared HTTP client
///
/// Every request carries a desktop browser User-Agent together with the
/// Accept, Accept-Language, Sec-Fetch-* and Upgrade-Insecure-Requests
/// headers a browser sends on navigation.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ja,en-US;q=0.9,en;q=0.8"),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL body, retrying timeouts and transport failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Return the body |
/// | Non-2xx status | Immediate → `FetchError::Status` |
/// | Timeout | Retry while attempts remain → `FetchError::Timeout` |
/// | Other transport error | Retry while attempts remain → `FetchError::Transport` |
///
/// The delay before retry `n` is `backoff_base * 2^(n-1)` plus up to 200ms
/// of random jitter.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    referer: Option<&str>,
    policy: &RetryPolicy,
) -> Result<String, FetchError> {
    let attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        let failure = match fetch_once(client, url, referer, policy.timeout).await {
            Ok(Attempt::Body(body)) => return Ok(body),
            Ok(Attempt::Status(status)) => {
                tracing::debug!("{} answered HTTP {}", url, status);
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                });
            }
            Err(failure) => failure,
        };

        let reason = match &failure {
            AttemptFailure::Timeout => "timeout",
            AttemptFailure::Transport(message) => message.as_str(),
        };

        if attempt >= attempts {
            tracing::warn!(
                "Giving up on {} after {} attempt(s): {}",
                url,
                attempt,
                reason
            );
            return Err(match failure {
                AttemptFailure::Timeout => FetchError::Timeout {
                    url: url.to_string(),
                    attempts: attempt,
                },
                AttemptFailure::Transport(message) => FetchError::Transport {
                    url: url.to_string(),
                    attempts: attempt,
                    message,
                },
            });
        }

        let delay = policy.backoff(attempt) + Duration::from_millis(jitter_ms());
        tracing::warn!(
            "Attempt {}/{} for {} failed ({}), retrying in {}ms",
            attempt,
            attempts,
            url,
            reason,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

async fn fetch_once(
    client: &Client,
    url: &str,
    referer: Option<&str>,
    timeout: Duration,
) -> Result<Attempt, AttemptFailure> {
    let mut request = client.get(url).timeout(timeout);
    if let Some(referer) = referer {
        request = request.header(REFERER, referer);
    }

    let response = request.send().await.map_err(AttemptFailure::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        return Ok(Attempt::Status(status.as_u16()));
    }

    response
        .text()
        .await
        .map(Attempt::Body)
        .map_err(AttemptFailure::from_reqwest)
}

fn jitter_ms() -> u64 {
    rand::rng().random_range(0..JITTER_MS)
}
