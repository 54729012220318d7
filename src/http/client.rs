//! Turso API transport
//!
//! [`HttpClient`] sends a [`PreparedRequest`], paces it through the shared
//! token bucket and retries throttling, gateway errors and timeouts with
//! backoff. Anything else surfaces on the first attempt.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::request::{default_user_agent, PreparedRequest, DEFAULT_BASE_URL};
use crate::decode::parse_json;
use crate::error::{Error, Result};
use crate::types::{BackoffType, JsonValue};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Transport settings. Defaults target the public Turso API.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Scheme and host, overridden in tests to point at a mock server
    pub base_url: String,
    pub timeout: Duration,
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub initial_backoff: Duration,
    /// Upper bound for backoff and for honoured `Retry-After` values
    pub max_backoff: Duration,
    pub backoff_type: BackoffType,
    /// `None` sends requests unpaced
    pub rate_limit: Option<RateLimiterConfig>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpClientConfig {
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Backoff shape plus its first and largest delay
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Sends without pacing; tests use this against mock servers
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Result of a single attempt
enum Outcome {
    /// Success status with the body fully read
    Done(String),
    Retry { error: Error, delay: Duration },
    Fatal(Error),
}

/// Paced, retrying client shared by every stream in a run
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Execute a request, retrying transient failures, and return the body
    ///
    /// 429 waits for `retry-after` (capped at `max_backoff`); 5xx, timeouts
    /// and connect errors wait for the backoff delay. Other 4xx fail at once.
    /// The body is read inside the attempt, so a stalled body counts as a
    /// timeout like a stalled response.
    pub async fn execute(&self, request: &PreparedRequest) -> Result<String> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            debug!(method = %request.method, url = %request.full_url(), attempt, "sending request");

            let (error, delay) = match self.send_once(request, attempt).await {
                Outcome::Done(body) => return Ok(body),
                Outcome::Fatal(error) => return Err(error),
                Outcome::Retry { error, delay } => (error, delay),
            };

            if attempt >= max_retries {
                return Err(error);
            }

            warn!(
                attempt = attempt + 1,
                max_attempts = max_retries + 1,
                ?delay,
                error = %error,
                "retrying request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Send a request once and classify the result
    async fn send_once(&self, request: &PreparedRequest, attempt: u32) -> Outcome {
        let mut req = self
            .client
            .request(request.method.into(), request.url.clone())
            .timeout(self.config.timeout);
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => return self.transport_failure(e, attempt),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = extract_retry_after(&response);
            return Outcome::Retry {
                error: Error::RateLimited {
                    retry_after_seconds: retry_after,
                },
                delay: std::cmp::min(Duration::from_secs(retry_after), self.config.max_backoff),
            };
        }

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            let error = Error::http_status(status.as_u16(), body);
            return if is_retryable_status(status) {
                Outcome::Retry {
                    error,
                    delay: self.calculate_backoff(attempt),
                }
            } else {
                Outcome::Fatal(error)
            };
        }

        match response.text().await {
            Ok(body) => {
                debug!(
                    status = status.as_u16(),
                    bytes = body.len(),
                    url = %request.url,
                    "request succeeded"
                );
                Outcome::Done(body)
            }
            Err(e) => self.transport_failure(e, attempt),
        }
    }

    /// Classify a reqwest failure while sending or reading the body
    fn transport_failure(&self, error: reqwest::Error, attempt: u32) -> Outcome {
        let delay = self.calculate_backoff(attempt);
        if error.is_timeout() {
            Outcome::Retry {
                error: Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                },
                delay,
            }
        } else if error.is_connect() {
            Outcome::Retry {
                error: Error::MaxRetriesExceeded {
                    max_retries: self.config.max_retries,
                    last: error.to_string(),
                },
                delay,
            }
        } else {
            Outcome::Fatal(Error::Http(error))
        }
    }

    /// Execute a request and parse the body as JSON
    ///
    /// A body that is not valid JSON is a decode error.
    pub async fn execute_json(&self, request: &PreparedRequest) -> Result<JsonValue> {
        let body = self.execute(request).await?;
        parse_json(&body)
    }

    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Delay before retry number `attempt + 1`, never above `max_backoff`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let HttpClientConfig {
            initial_backoff,
            max_backoff,
            backoff_type,
            ..
        } = self.config;
        let multiplier = match backoff_type {
            BackoffType::Constant => 1,
            BackoffType::Linear => attempt.saturating_add(1),
            BackoffType::Exponential => 2u32.saturating_pow(attempt),
        };
        initial_backoff.saturating_mul(multiplier).min(max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    crate::error::is_retryable_status(status.as_u16())
}

/// `Retry-After` in seconds; 60 when absent or not a number
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(60)
}
