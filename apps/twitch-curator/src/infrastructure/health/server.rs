//! Health and metrics server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::metrics::get_metrics_handle;

use super::{HealthResponse, HealthStatus, UpstreamHealth};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Version, start time and upstream recorder behind the health routes.
pub struct HealthServerState {
    version: String,
    started_at: Instant,
    upstream: Arc<UpstreamHealth>,
}

impl HealthServerState {
    /// Start the uptime clock.
    #[must_use]
    pub fn new(version: String, upstream: Arc<UpstreamHealth>) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            upstream,
        }
    }

    fn report(&self) -> HealthResponse {
        let upstream = self.upstream.snapshot();

        HealthResponse {
            status: upstream.status(),
            version: self.version.clone(),
            uptime_secs: self.started_at.elapsed().as_secs(),
            current_time: Utc::now(),
            upstream,
        }
    }
}

/// Serves the health routes until the token is cancelled.
pub struct HealthServer {
    port: u16,
    state: Arc<HealthServerState>,
    cancel: CancellationToken,
}

impl HealthServer {
    /// Bind nothing yet; see [`HealthServer::run`].
    #[must_use]
    pub const fn new(port: u16, state: Arc<HealthServerState>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Bind the port and serve.
    ///
    /// # Errors
    ///
    /// Returns `HealthServerError` if the port cannot be bound or the
    /// server stops with an I/O error.
    pub async fn run(self) -> Result<(), HealthServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| HealthServerError::Bind {
                port: self.port,
                source,
            })?;

        tracing::info!(port = self.port, "Health server listening");

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(HealthServerError::Serve)?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}

fn router(state: Arc<HealthServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(|| async { "OK" }))
        .route("/readyz", get(ready))
        .route("/metrics", get(prometheus))
        .with_state(state)
}

async fn health(State(state): State<Arc<HealthServerState>>) -> Response {
    let report = state.report();
    let code = if report.status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (code, Json(report)).into_response()
}

async fn ready(State(state): State<Arc<HealthServerState>>) -> Response {
    match state.upstream.snapshot().status() {
        HealthStatus::Unhealthy => (StatusCode::SERVICE_UNAVAILABLE, "NOT READY").into_response(),
        HealthStatus::Healthy | HealthStatus::Degraded => "READY".into_response(),
    }
}

async fn prometheus() -> Response {
    match get_metrics_handle() {
        Some(handle) => ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], handle.render())
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// Health server failures.
#[derive(Debug, thiserror::Error)]
pub enum HealthServerError {
    /// The port is unavailable.
    #[error("cannot bind health port {port}: {source}")]
    Bind {
        /// Requested port.
        port: u16,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The accept loop failed.
    #[error("health server failed: {0}")]
    Serve(#[source] io::Error),
}
