//! Health Reporting
//!
//! Tracks how Helix calls are going and serves that state, together with
//! Prometheus metrics, on a separate port for orchestrators and scrapers.
//!
//! # Endpoints
//!
//! - `GET /health` - JSON report including upstream counters
//! - `GET /healthz` - Liveness, always `OK`
//! - `GET /readyz` - Readiness, `503` once Helix keeps failing
//! - `GET /metrics` - Prometheus text exposition

mod server;

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

pub use server::{HealthServer, HealthServerError, HealthServerState};

/// Consecutive Helix failures that mark the service degraded.
const DEGRADED_AFTER: u32 = 1;

/// Consecutive Helix failures that mark the service unhealthy.
const UNHEALTHY_AFTER: u32 = 5;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Derived from the upstream failure streak.
    pub status: HealthStatus,
    /// Crate version.
    pub version: String,
    /// Seconds since the health server state was created.
    pub uptime_secs: u64,
    /// Server clock at the time of the report.
    pub current_time: DateTime<Utc>,
    /// Helix call counters.
    pub upstream: UpstreamStatus,
}

/// Service condition as seen from Helix calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Last Helix call succeeded (or none were made yet).
    Healthy,
    /// Helix failed recently; requests may still work.
    Degraded,
    /// Helix has failed repeatedly.
    Unhealthy,
}

/// Snapshot of Helix call outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamStatus {
    /// Calls that reached Helix.
    pub succeeded: u64,
    /// Calls that did not.
    pub failed: u64,
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// When Helix last answered.
    pub last_success: Option<DateTime<Utc>>,
    /// Most recent failure message.
    pub last_error: Option<String>,
}

impl UpstreamStatus {
    /// Health implied by the current failure streak.
    #[must_use]
    pub const fn status(&self) -> HealthStatus {
        if self.consecutive_failures >= UNHEALTHY_AFTER {
            HealthStatus::Unhealthy
        } else if self.consecutive_failures >= DEGRADED_AFTER {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Lock-light recorder shared by the Helix client and the health server.
#[derive(Debug, Default)]
pub struct UpstreamHealth {
    succeeded: AtomicU64,
    failed: AtomicU64,
    consecutive_failures: AtomicU32,
    last_success: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
}

impl UpstreamHealth {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Helix answered.
    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
        *self.last_success.write() = Some(Utc::now());
    }

    /// Helix could not be used.
    pub fn record_failure(&self, error: impl Into<String>) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write() = Some(error.into());
    }

    /// Copy of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> UpstreamStatus {
        UpstreamStatus {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            consecutive_failures: self.consecutive_failures.load(Ordering::Relaxed),
            last_success: *self.last_success.read(),
            last_error: self.last_error.read().clone(),
        }
    }
}
