//! HTTP response DTOs.

use serde::Serialize;

/// Response from `GET /api/getUsername`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsernameResponse {
    /// Name of the user running the server.
    pub username: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}
