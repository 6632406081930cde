//! Twitch Curator Binary
//!
//! Starts the API server and the health server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin twitch-curator
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `TWITCH_CLIENT_ID`: Twitch application client ID
//! - `TWITCH_ACCESS_TOKEN` or `TWITCH_CLIENT_SECRET`: static token, or secret
//!   for the client-credentials grant
//!
//! ## Optional
//! - `PORT`: API and static file port (default: 8080)
//! - `CURATOR_HEALTH_PORT`: Health check HTTP port, 0 disables (default: 8082)
//! - `CURATOR_STATIC_DIR`: Front-end build directory (default: dist)
//! - `TWITCH_HELIX_URL`, `TWITCH_TOKEN_URL`: Upstream endpoints
//! - `TWITCH_TIMEOUT_SECS`, `TWITCH_MAX_ATTEMPTS`, `TWITCH_RETRY_INITIAL_MS`,
//!   `TWITCH_RETRY_MAX_SECS`: Upstream timeout and retry policy
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: twitch-curator)
//! - `RUST_LOG`: Log filter (default: `twitch_curator=info`)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use twitch_curator::infrastructure::http::current_username;
use twitch_curator::{
    AppState, CuratorConfig, HealthServer, HealthServerState, HelixAdapter, TwitchAuth,
    create_router, init_metrics, init_telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let _telemetry_guard = init_telemetry();

    tracing::info!("Starting Twitch Curator");

    // Initialize Prometheus metrics
    init_metrics().context("failed to install Prometheus recorder")?;

    let config = CuratorConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // Helix adapter and HTTP state
    let helix = Arc::new(
        HelixAdapter::new(&config.credentials, &config.helix)
            .context("failed to build Helix client")?,
    );
    let upstream_health = helix.upstream_health();
    let state = AppState::new(helix, current_username());
    let app = create_router(state, &config.server.static_dir);

    // Spawn health server
    if config.server.health_port == 0 {
        tracing::info!("Health server disabled");
    } else {
        let health_state = Arc::new(HealthServerState::new(
            env!("CARGO_PKG_VERSION").to_string(),
            upstream_health,
        ));
        let health_server = HealthServer::new(
            config.server.health_port,
            health_state,
            shutdown_token.clone(),
        );
        tokio::spawn(async move {
            if let Err(e) = health_server.run().await {
                tracing::error!(error = %e, "Health server error");
            }
        });
    }

    // Spawn shutdown listener
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        await_shutdown(signal_token).await;
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind API port {}", config.server.port))?;

    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_token.cancelled_owned())
        .await
        .context("API server failed")?;

    tracing::info!("Twitch Curator stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &CuratorConfig) {
    let auth = match config.credentials.auth() {
        TwitchAuth::StaticToken(_) => "static_token",
        TwitchAuth::ClientCredentials { .. } => "client_credentials",
    };

    tracing::info!(
        port = config.server.port,
        health_port = config.server.health_port,
        static_dir = %config.server.static_dir.display(),
        auth,
        "Configuration loaded"
    );
    tracing::debug!(
        helix_url = %config.helix.base_url,
        token_url = %config.helix.token_url,
        timeout_secs = config.helix.timeout.as_secs(),
        max_attempts = config.helix.retry.max_attempts,
        "Helix endpoints"
    );
}

/// Load the nearest `.env`, searching from the working directory upward.
fn load_dotenv() {
    let Ok(cwd) = std::env::current_dir() else {
        return;
    };

    if let Some(path) = cwd
        .ancestors()
        .map(|dir| dir.join(".env"))
        .find(|path| path.is_file())
    {
        let _ = dotenvy::from_path(&path);
    }
}

/// Cancel `shutdown_token` on Ctrl+C or SIGTERM.
async fn await_shutdown(shutdown_token: CancellationToken) {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {
            tracing::info!("Interrupted, shutting down");
        }
        () = terminate => {
            tracing::info!("Terminated, shutting down");
        }
    }

    shutdown_token.cancel();
}
