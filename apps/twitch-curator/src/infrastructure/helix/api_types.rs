//! Helix API response types.
//!
//! These types map directly to Helix's JSON envelopes. Record types live in
//! the application ports.

use serde::Deserialize;

/// Envelope around every Helix list response.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixPage<T> {
    /// Returned records.
    pub data: Vec<T>,
}

/// Error body returned by Helix and the OAuth endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HelixErrorResponse {
    /// Reason phrase, e.g. `Bad Request`.
    pub error: String,
    /// Human readable detail.
    pub message: String,
}

impl HelixErrorResponse {
    /// Best message available, preferring `message` over `error`.
    pub fn into_message(self) -> String {
        if self.message.is_empty() {
            self.error
        } else {
            self.message
        }
    }
}

/// Response from the OAuth client-credentials grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// App access token.
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}
