use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;

pub mod rate_limit;

use crate::config::HttpConfig;
use crate::{Result, TranscriptError};

/// Browser identity sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Accept-Language used when no caption language was requested
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Retries after the first attempt before a failure is surfaced
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Fixed pause between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// A single GET issued through an [`HttpTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,

    /// Overrides the transport's default Accept-Language
    pub accept_language: Option<String>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            accept_language: None,
        }
    }

    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.accept_language = language.map(str::to_string);
        self
    }
}

/// Performs one HTTP GET and returns the body as text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Any non-success status is an error
    async fn get(&self, request: FetchRequest) -> Result<String>;
}

/// Bounded sequential retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Fetch `request`, retrying transient failures per `policy`.
///
/// Only [`TranscriptError::NetworkFailure`] is retried. Other errors, rate
/// limiting included, are returned from the attempt that produced them. When
/// every attempt fails the last failure is returned.
pub async fn fetch_with_retry(
    transport: &dyn HttpTransport,
    request: &FetchRequest,
    policy: &RetryPolicy,
) -> Result<String> {
    let mut retries_remaining = policy.max_retries;

    loop {
        match transport.get(request.clone()).await {
            Ok(body) => return Ok(body),
            Err(err) if err.is_retryable() && retries_remaining > 0 => {
                tracing::warn!(
                    "Request to {} failed ({}), retrying in {:?} ({} retries left)",
                    request.url,
                    err,
                    policy.delay,
                    retries_remaining
                );
                retries_remaining -= 1;
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// [`HttpTransport`] backed by a shared reqwest client
pub struct ReqwestTransport {
    client: reqwest::Client,
    accept_language: String,
}

impl ReqwestTransport {
    /// Create a transport with the default browser headers
    pub fn new() -> Result<Self> {
        Self::from_config(&HttpConfig::default())
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| TranscriptError::FetchFailed(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, user_agent);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TranscriptError::FetchFailed(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            accept_language: config.accept_language.clone(),
        })
    }
}

/// 429 is a rate limit and terminal; any other non-2xx status is a retryable network failure
fn check_status(status: StatusCode, url: &str) -> Result<()> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TranscriptError::RateLimited(format!("HTTP 429 from {}", url)));
    }
    if !status.is_success() {
        return Err(TranscriptError::NetworkFailure(format!("HTTP {} from {}", status, url)));
    }
    Ok(())
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: FetchRequest) -> Result<String> {
        tracing::debug!("GET {}", request.url);

        let accept_language = request
            .accept_language
            .as_deref()
            .unwrap_or(&self.accept_language);

        let response = self
            .client
            .get(&request.url)
            .header(ACCEPT_LANGUAGE, accept_language)
            .send()
            .await
            .map_err(|e| TranscriptError::NetworkFailure(format!("{}: {}", request.url, e)))?;

        check_status(response.status(), &request.url)?;

        response
            .text()
            .await
            .map_err(|e| TranscriptError::NetworkFailure(format!("failed to read body from {}: {}", request.url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn no_delay(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let mut transport = MockHttpTransport::new();
        let mut calls = 0;
        transport.expect_get().times(3).returning(move |_| {
            calls += 1;
            if calls < 3 {
                Err(TranscriptError::NetworkFailure("HTTP 503".to_string()))
            } else {
                Ok("body".to_string())
            }
        });

        let request = FetchRequest::new("https://example.com");
        let body = assert_ok!(fetch_with_retry(&transport, &request, &no_delay(3)).await);
        assert_eq!(body, "body");
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_last_failure() {
        let mut transport = MockHttpTransport::new();
        let mut calls = 0;
        transport.expect_get().times(4).returning(move |_| {
            calls += 1;
            Err(TranscriptError::NetworkFailure(format!("attempt {}", calls)))
        });

        let request = FetchRequest::new("https://example.com");
        let err = assert_err!(fetch_with_retry(&transport, &request, &no_delay(3)).await);
        assert!(matches!(err, TranscriptError::NetworkFailure(ref m) if m == "attempt 4"));
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(|_| Err(TranscriptError::RateLimited("HTTP 429".to_string())));

        let request = FetchRequest::new("https://example.com");
        let err = assert_err!(fetch_with_retry(&transport, &request, &no_delay(3)).await);
        assert!(matches!(err, TranscriptError::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_request_language_is_forwarded() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .withf(|request| request.accept_language.as_deref() == Some("fr"))
            .times(1)
            .returning(|_| Ok(String::new()));

        let request = FetchRequest::new("https://example.com").with_language(Some("fr"));
        assert_ok!(fetch_with_retry(&transport, &request, &no_delay(0)).await);
    }

    #[test]
    fn test_status_classification() {
        let url = "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ";
        assert_ok!(check_status(StatusCode::OK, url));

        let err = assert_err!(check_status(StatusCode::TOO_MANY_REQUESTS, url));
        assert!(matches!(err, TranscriptError::RateLimited(_)));
        assert!(!err.is_retryable());

        for status in [StatusCode::NOT_FOUND, StatusCode::FORBIDDEN, StatusCode::SERVICE_UNAVAILABLE] {
            let err = assert_err!(check_status(status, url));
            assert!(matches!(err, TranscriptError::NetworkFailure(ref m) if m.contains(status.as_str())));
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }
}
