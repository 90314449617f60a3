use crate::config::HttpConfig;
use crate::error::Error;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use thiserror::Error as ThisError;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Query parameters for a GET request.
pub type Query<'a> = &'a [(&'a str, String)];

/// Outcome of a single failed HTTP attempt.
#[derive(Debug, ThisError)]
pub enum HttpError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid response from {url} at '{path}': {message}")]
    Decode {
        url: String,
        path: String,
        message: String,
    },
}

impl HttpError {
    /// Transport errors, timeouts and 5xx are worth another attempt. No 4xx is.
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::Transport { .. } => true,
            HttpError::Status { status, .. } => *status >= 500,
            HttpError::Decode { .. } => false,
        }
    }
}

/// The last error of a request together with how many attempts were spent on it.
#[derive(Debug)]
pub struct Failure {
    pub attempts: u32,
    pub error: HttpError,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.backoff_base_ms),
            max_delay: Duration::from_millis(config.backoff_max_ms),
        }
    }

    /// A policy that never retries.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after `failed_attempts` consecutive failures.
    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1);
        let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

/// Run `op` until it succeeds, fails permanently, or the attempt budget runs out.
///
/// `op` receives the 1-based attempt number.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, Failure>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() && attempt < max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    "{} (attempt {}/{}), retrying in {:?}",
                    error, attempt, max_attempts, delay
                );
                sleep(delay).await;
            }
            Err(error) => return Err(Failure { attempts: attempt, error }),
        }
    }
}

/// Decode a JSON body, reporting the path of the offending field on failure.
pub fn decode_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, HttpError> {
    let deserializer = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(deserializer).map_err(|e| HttpError::Decode {
        url: url.to_string(),
        path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}

/// Shared GET client for every provider in one invocation.
///
/// Cloning is cheap and shares the underlying connection pool, which is
/// released once the last clone is dropped.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> crate::Result<Self> {
        // IMDb localises titles by this header.
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Validation(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_policy(client, RetryPolicy::from_config(config)))
    }

    pub fn with_policy(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: Query<'_>,
    ) -> Result<T, Failure> {
        with_retry(&self.policy, |attempt| async move {
            let body = self.attempt_text(url, query, attempt).await?;
            decode_json(url, &body)
        })
        .await
    }

    pub async fn get_text(&self, url: &str, query: Query<'_>) -> Result<String, Failure> {
        with_retry(&self.policy, |attempt| self.attempt_text(url, query, attempt)).await
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, Failure> {
        with_retry(&self.policy, |attempt| async move {
            let response = self.send(url, &[], attempt).await?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| transport_error(url, &e))?;
            Ok(bytes.to_vec())
        })
        .await
    }

    async fn attempt_text(
        &self,
        url: &str,
        query: Query<'_>,
        attempt: u32,
    ) -> Result<String, HttpError> {
        let response = self.send(url, query, attempt).await?;
        response.text().await.map_err(|e| transport_error(url, &e))
    }

    async fn send(
        &self,
        url: &str,
        query: Query<'_>,
        attempt: u32,
    ) -> Result<reqwest::Response, HttpError> {
        debug!("GET {} (attempt {})", url, attempt);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            debug!("GET {} returned {}", url, status);
            return Err(HttpError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

fn transport_error(url: &str, error: &reqwest::Error) -> HttpError {
    let mut message = if error.is_timeout() {
        "timed out".to_string()
    } else {
        error.to_string()
    };

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    HttpError::Transport {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::cell::Cell;

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    fn timeout() -> HttpError {
        HttpError::Transport {
            url: "http://provider.test".into(),
            message: "timed out".into(),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff(3), Duration::from_millis(2000));
        assert_eq!(policy.backoff(4), Duration::from_secs(3));
        assert_eq!(policy.backoff(64), Duration::from_secs(3));
    }

    #[test]
    fn test_retry_classification() {
        let status = |status| HttpError::Status {
            url: "u".into(),
            status,
        };
        assert!(timeout().is_retryable());
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(429).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!status(400).is_retryable());
    }

    #[tokio::test]
    async fn test_timeouts_stop_at_attempt_cap() {
        let calls = Cell::new(0);
        let result: Result<(), Failure> = with_retry(&instant_policy(3), |_| {
            calls.set(calls.get() + 1);
            async { Err(timeout()) }
        })
        .await;

        let failure = result.unwrap_err();
        assert_eq!(calls.get(), 3);
        assert_eq!(failure.attempts, 3);
        assert!(matches!(failure.error, HttpError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), Failure> = with_retry(&instant_policy(5), |_| {
            calls.set(calls.get() + 1);
            async {
                Err(HttpError::Status {
                    url: "u".into(),
                    status: 404,
                })
            }
        })
        .await;

        assert_eq!(calls.get(), 1);
        assert_eq!(result.unwrap_err().attempts, 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let result = with_retry(&instant_policy(3), |attempt| async move {
            if attempt < 2 { Err(timeout()) } else { Ok(attempt) }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_zero_attempt_budget_still_tries_once() {
        let calls = Cell::new(0);
        let _: Result<(), Failure> = with_retry(&instant_policy(0), |_| {
            calls.set(calls.get() + 1);
            async { Err(timeout()) }
        })
        .await;
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_decode_reports_field_path() {
        #[derive(Debug, Deserialize)]
        struct Outer {
            #[allow(dead_code)]
            data: Inner,
        }
        #[derive(Debug, Deserialize)]
        struct Inner {
            #[allow(dead_code)]
            count: u32,
        }

        let err = decode_json::<Outer>("http://x", r#"{"data":{"count":"many"}}"#).unwrap_err();
        match err {
            HttpError::Decode { path, .. } => assert_eq!(path, "data.count"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
