#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::unreadable_literal
    )
)]

//! Twitch Curator - Helix Proxy Backend
//!
//! Backend for a stream-curation front-end. Serves a small JSON API that
//! wraps the Twitch Helix REST API: lists of top and user-selected games,
//! live streams for those games, and streamer details. The front-end build
//! is served from the same port.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core types with no I/O
//!   - `game`, `stream`: Models returned to the front-end
//!   - `dedup`: Order-preserving de-duplication and merging
//!   - `query`: Querystring parsing and validation
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: `HelixPort` and the raw Helix records
//!   - `services`: `GameCatalog`, `StreamDirectory`
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `helix`: reqwest client with auth, retries and token refresh
//!   - `http`: axum router for `/api` and static files
//!   - `config`: Configuration from environment variables
//!   - `health`: Health check and metrics endpoint
//!
//! # Data Flow
//!
//! ```text
//! Browser ──► /api/games/combo ──► GameCatalog ──┬─► GET /helix/games
//!                                                └─► GET /helix/games/top
//!         ──► /api/streams/*   ──► StreamDirectory ──► GET /helix/streams | /helix/users
//!         ──► /*               ──► static dir
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core types with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::game::Game;
pub use domain::query::{QueryError, QueryParams};
pub use domain::stream::Stream;

// Application
pub use application::ports::{HelixError, HelixPort};
pub use application::services::{GameCatalog, StreamDirectory};

// Infrastructure config
pub use infrastructure::config::{
    ConfigError, Credentials, CuratorConfig, HelixSettings, RetrySettings, ServerSettings,
    TwitchAuth,
};

// Helix adapter
pub use infrastructure::helix::HelixAdapter;

// HTTP API
pub use infrastructure::http::{AppState, create_router};

// Health server
pub use infrastructure::health::{
    HealthServer, HealthServerError, HealthServerState, UpstreamHealth,
};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
