//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following
//! the Hexagonal Architecture pattern. These are the contracts that
//! infrastructure adapters must implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - `HelixPort`: Twitch Helix REST API (games, streams, users)
//!
//! Records mirror the subset of the Helix JSON the services read. Helix
//! sends IDs as strings; conversion to numbers happens in the services.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::query::Pagination;

// =============================================================================
// Upstream Records
// =============================================================================

/// A game from `GET /games` or `GET /games/top`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Game ID (numeric string).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Box art URL template.
    #[serde(default)]
    pub box_art_url: String,
}

/// A live stream from `GET /streams`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Broadcaster user ID (numeric string).
    pub user_id: String,
    /// Broadcaster login.
    #[serde(default)]
    pub user_login: String,
    /// Broadcaster display name.
    #[serde(default)]
    pub user_name: String,
    /// Game ID (numeric string, empty when unset).
    #[serde(default)]
    pub game_id: String,
    /// Broadcast language.
    #[serde(default)]
    pub language: String,
    /// Current viewers.
    #[serde(default)]
    pub viewer_count: u64,
}

/// A user from `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User ID (numeric string).
    pub id: String,
    /// Login name.
    pub login: String,
    /// Display name.
    #[serde(default)]
    pub display_name: String,
}

/// Filter for `GET /streams`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamFilter {
    /// Restrict to these games (empty = any game).
    pub game_ids: Vec<u64>,
    /// Restrict to these languages (empty = any language).
    pub languages: Vec<String>,
    /// Page size and cursor.
    pub page: Pagination,
}

// =============================================================================
// Errors
// =============================================================================

/// Helix port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HelixError {
    /// Request never produced a response.
    #[error("Helix network error: {0}")]
    Network(String),

    /// Helix answered with a non-success status.
    #[error("Helix returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Credentials were rejected.
    #[error("Helix rejected the configured credentials")]
    Unauthorized,

    /// Rate limit exhausted.
    #[error("Helix rate limit reached, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until the limit resets.
        retry_after_secs: u64,
    },

    /// Response body was not the expected JSON.
    #[error("Helix response parsing error: {0}")]
    JsonParse(String),

    /// A record could not be mapped to a model.
    #[error("invalid Helix record: {0}")]
    InvalidRecord(String),

    /// App access token could not be obtained.
    #[error("access token request failed: {0}")]
    Token(String),

    /// Retries exhausted.
    #[error("Helix request failed after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Attempts made before giving up.
        attempts: u32,
    },
}

// =============================================================================
// Port
// =============================================================================

/// Port for Twitch Helix reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HelixPort: Send + Sync {
    /// Games sorted by current viewers.
    async fn top_games(&self, page: &Pagination) -> Result<Vec<GameRecord>, HelixError>;

    /// Games by exact ID or name.
    async fn games(&self, ids: &[u64], names: &[String]) -> Result<Vec<GameRecord>, HelixError>;

    /// Live streams, sorted by viewers.
    async fn streams(&self, filter: &StreamFilter) -> Result<Vec<StreamRecord>, HelixError>;

    /// Users by ID or login.
    async fn users(&self, ids: &[u64], logins: &[String]) -> Result<Vec<UserRecord>, HelixError>;
}
