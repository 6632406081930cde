//! Mapping of domain and upstream errors to HTTP responses.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::application::ports::HelixError;
use crate::domain::query::QueryError;

use super::response::ErrorResponse;

/// Error returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The query string was rejected.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Helix could not serve the request.
    #[error(transparent)]
    Helix(#[from] HelixError),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Query(_) => StatusCode::BAD_REQUEST,
            Self::Helix(HelixError::RateLimited { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Helix(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::Query(e) => tracing::debug!(error = %e, "Rejected query"),
            Self::Helix(e) => tracing::error!(error = %e, "Upstream request failed"),
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        if let Self::Helix(HelixError::RateLimited { retry_after_secs }) = self {
            return (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response();
        }

        (status, body).into_response()
    }
}
