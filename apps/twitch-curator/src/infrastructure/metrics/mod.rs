//! Prometheus Metrics Module
//!
//! Exposes application metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **API**: Requests served by route and status
//! - **Upstream**: Helix calls by endpoint and outcome, with latency
//! - **Auth**: App access token refreshes
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the health server port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Later calls return the handle installed by the first one.
///
/// # Errors
///
/// Returns an error if the recorder cannot be installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "curator_api_requests_total",
        "Total API requests served by route and status"
    );

    describe_counter!(
        "curator_upstream_requests_total",
        "Total Helix requests by endpoint and outcome"
    );
    describe_counter!(
        "curator_upstream_retries_total",
        "Total Helix request retries"
    );
    describe_histogram!(
        "curator_upstream_request_seconds",
        "Helix request latency including retries"
    );

    describe_counter!(
        "curator_token_refreshes_total",
        "Total app access token requests by outcome"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Metric labels for Helix endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelixEndpoint {
    /// `GET /games/top`.
    TopGames,
    /// `GET /games`.
    Games,
    /// `GET /streams`.
    Streams,
    /// `GET /users`.
    Users,
}

impl HelixEndpoint {
    /// Request path relative to the Helix base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::TopGames => "/games/top",
            Self::Games => "/games",
            Self::Streams => "/streams",
            Self::Users => "/users",
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::TopGames => "top_games",
            Self::Games => "games",
            Self::Streams => "streams",
            Self::Users => "users",
        }
    }
}

/// Metric labels for upstream call outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// 2xx with a parseable body.
    Success,
    /// Non-retryable error status.
    ClientError,
    /// 5xx after retries.
    ServerError,
    /// 429 after retries.
    RateLimited,
    /// Credentials rejected.
    Unauthorized,
    /// Transport failure.
    Network,
    /// Body did not parse.
    InvalidBody,
}

impl UpstreamOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
            Self::RateLimited => "rate_limited",
            Self::Unauthorized => "unauthorized",
            Self::Network => "network",
            Self::InvalidBody => "invalid_body",
        }
    }
}

/// Record an API request served.
pub fn record_api_request(route: &str, status: u16) {
    counter!(
        "curator_api_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a finished Helix call.
pub fn record_upstream_request(
    endpoint: HelixEndpoint,
    outcome: UpstreamOutcome,
    duration: Duration,
) {
    counter!(
        "curator_upstream_requests_total",
        "endpoint" => endpoint.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!(
        "curator_upstream_request_seconds",
        "endpoint" => endpoint.as_str()
    )
    .record(duration.as_secs_f64());
}

/// Record a Helix retry.
pub fn record_upstream_retry(endpoint: HelixEndpoint) {
    counter!(
        "curator_upstream_retries_total",
        "endpoint" => endpoint.as_str()
    )
    .increment(1);
}

/// Record an app access token request.
pub fn record_token_refresh(success: bool) {
    counter!(
        "curator_token_refreshes_total",
        "outcome" => if success { "success" } else { "failure" }
    )
    .increment(1);
}

// =============================================================================
// Tests
// =============================================================================
