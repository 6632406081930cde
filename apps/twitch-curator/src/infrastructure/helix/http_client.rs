//! Helix HTTP client: auth headers, token refresh and retries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::application::ports::HelixError;
use crate::infrastructure::config::{Credentials, HelixSettings, RetrySettings};
use crate::infrastructure::health::UpstreamHealth;
use crate::infrastructure::metrics::{self, HelixEndpoint, UpstreamOutcome};

use super::api_types::{HelixErrorResponse, HelixPage};
use super::auth::TokenProvider;

/// Used when a 429 carries neither `Retry-After` nor `Ratelimit-Reset`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// HTTP client for the Helix API with retry logic.
#[derive(Debug, Clone)]
pub struct HelixHttpClient {
    client: Client,
    base_url: String,
    client_id: String,
    tokens: Arc<TokenProvider>,
    retry_config: RetrySettings,
    health: Arc<UpstreamHealth>,
}

impl HelixHttpClient {
    /// Create a new HTTP client from config.
    ///
    /// # Errors
    ///
    /// Returns `HelixError::Network` if the HTTP client cannot be built.
    pub fn new(credentials: &Credentials, settings: &HelixSettings) -> Result<Self, HelixError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| HelixError::Network(e.to_string()))?;

        let tokens = TokenProvider::new(client.clone(), credentials, settings.token_url.clone());

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client_id: credentials.client_id().to_string(),
            tokens: Arc::new(tokens),
            retry_config: settings.retry.clone(),
            health: Arc::new(UpstreamHealth::new()),
        })
    }

    /// Outcome tracker fed by every call made through this client.
    #[must_use]
    pub fn upstream_health(&self) -> Arc<UpstreamHealth> {
        Arc::clone(&self.health)
    }

    /// GET a Helix list endpoint and return its `data` array.
    ///
    /// Repeated keys in `query` are sent as repeated query parameters.
    ///
    /// # Errors
    ///
    /// Returns `HelixError` if the request fails after retries.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: HelixEndpoint,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, HelixError> {
        let started = Instant::now();
        let result = self.request::<T>(endpoint, query).await;
        let outcome = outcome_of(&result);
        metrics::record_upstream_request(endpoint, outcome, started.elapsed());

        match &result {
            Ok(_) => self.health.record_success(),
            Err(e) => {
                tracing::warn!(endpoint = endpoint.path(), error = %e, "Helix request failed");
                // A 4xx still proves Helix is reachable.
                if outcome == UpstreamOutcome::ClientError {
                    self.health.record_success();
                } else {
                    self.health.record_failure(e.to_string());
                }
            }
        }
        result
    }

    /// Send until success, a final error, or the retry budget runs out.
    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: HelixEndpoint,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, HelixError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let mut backoff = ExponentialBackoff::new(&self.retry_config);
        let mut token_refreshed = false;

        loop {
            let token = self.tokens.token().await?;
            let failure = match self.send_once(&url, query, &token).await {
                Ok(data) => return Ok(data),
                Err(failure) => failure,
            };

            if failure.error == HelixError::Unauthorized {
                if token_refreshed || !self.tokens.can_refresh() {
                    return Err(failure.error);
                }
                tracing::info!(endpoint = endpoint.path(), "Helix rejected token, refreshing");
                self.tokens.invalidate(&token).await;
                token_refreshed = true;
                continue;
            }

            if !failure.retryable {
                return Err(failure.error);
            }

            let Some(delay) = backoff.next_backoff() else {
                return Err(backoff.exhausted(failure.error));
            };
            let delay = failure
                .wait
                .map_or(delay, |wait| wait.min(self.retry_config.max_backoff));

            tracing::warn!(
                endpoint = endpoint.path(),
                error = %failure.error,
                delay_ms = delay.as_millis(),
                attempt = backoff.attempt,
                "Helix call failed, retrying"
            );
            metrics::record_upstream_retry(endpoint);
            tokio::time::sleep(delay).await;
        }
    }

    /// One GET with the given token.
    async fn send_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<Vec<T>, Failure> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Client-Id", &self.client_id)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Failure::retryable(HelixError::Network(e.to_string()), None))?;

        let status = response.status();

        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| Failure::fatal(HelixError::Network(e.to_string())))?;
            let page: HelixPage<T> = serde_json::from_str(&text)
                .map_err(|e| Failure::fatal(HelixError::JsonParse(e.to_string())))?;
            return Ok(page.data);
        }

        let retry_after = retry_after_secs(response.headers());
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<HelixErrorResponse>(&body)
            .map_or(body, HelixErrorResponse::into_message);

        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!(%message, "Helix returned 401");
            return Err(Failure::fatal(HelixError::Unauthorized));
        }

        let status_error = HelixError::Status {
            status: status.as_u16(),
            message,
        };
        Err(match categorize_status(status) {
            ErrorCategory::RateLimited => Failure::retryable(
                HelixError::RateLimited {
                    retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
                },
                retry_after.map(Duration::from_secs),
            ),
            ErrorCategory::Retryable => Failure::retryable(status_error, None),
            ErrorCategory::NonRetryable => Failure::fatal(status_error),
        })
    }
}

/// A failed send and whether another attempt may help.
struct Failure {
    error: HelixError,
    retryable: bool,
    /// Server-requested delay before the next attempt.
    wait: Option<Duration>,
}

impl Failure {
    const fn fatal(error: HelixError) -> Self {
        Self {
            error,
            retryable: false,
            wait: None,
        }
    }

    const fn retryable(error: HelixError, wait: Option<Duration>) -> Self {
        Self {
            error,
            retryable: true,
            wait,
        }
    }
}

/// Seconds to wait before retrying a 429.
///
/// `Retry-After` wins; otherwise Helix's `Ratelimit-Reset` epoch timestamp
/// is turned into a delay of at least one second.
fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    if let Some(secs) = header("Retry-After") {
        return u64::try_from(secs).ok();
    }

    let reset = header("Ratelimit-Reset")?;
    let remaining = reset - chrono::Utc::now().timestamp();
    u64::try_from(remaining.max(1)).ok()
}

fn outcome_of<T>(result: &Result<T, HelixError>) -> UpstreamOutcome {
    match result {
        Ok(_) => UpstreamOutcome::Success,
        Err(HelixError::Network(_)) => UpstreamOutcome::Network,
        Err(HelixError::RateLimited { .. }) => UpstreamOutcome::RateLimited,
        Err(HelixError::Unauthorized | HelixError::Token(_)) => UpstreamOutcome::Unauthorized,
        Err(HelixError::JsonParse(_) | HelixError::InvalidRecord(_)) => {
            UpstreamOutcome::InvalidBody
        }
        Err(HelixError::Status { status, .. }) if *status >= 500 => UpstreamOutcome::ServerError,
        Err(HelixError::Status { .. }) => UpstreamOutcome::ClientError,
        Err(HelixError::MaxRetriesExceeded { .. }) => UpstreamOutcome::ServerError,
    }
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Exponential backoff calculator.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    const fn new(config: &RetrySettings) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }

    /// Final error once no attempts remain.
    ///
    /// A single-attempt policy, or a rate limit, reports the underlying
    /// error unchanged.
    fn exhausted(&self, last: HelixError) -> HelixError {
        if self.attempt > 1 && !matches!(last, HelixError::RateLimited { .. }) {
            HelixError::MaxRetriesExceeded {
                attempts: self.attempt,
            }
        } else {
            last
        }
    }
}
