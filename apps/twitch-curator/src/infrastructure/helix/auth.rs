//! Bearer token source for Helix requests.

use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::Mutex;

use crate::application::ports::HelixError;
use crate::infrastructure::config::{Credentials, TwitchAuth};
use crate::infrastructure::metrics;

use super::api_types::{HelixErrorResponse, TokenResponse};

/// Tokens are refreshed this long before Twitch says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Upper bound on a cached token's life. Twitch app tokens last about 60 days.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Supplies the bearer token for Helix calls.
///
/// A static token is returned as configured. With a client secret, an app
/// access token is requested on first use and cached until shortly before
/// it expires. The cache lock is held across the token request, so
/// concurrent callers wait for a single refresh.
pub struct TokenProvider {
    http: Client,
    client_id: String,
    auth: TwitchAuth,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("auth", &self.auth)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl TokenProvider {
    /// Create a token provider sharing the given HTTP client.
    #[must_use]
    pub fn new(http: Client, credentials: &Credentials, token_url: impl Into<String>) -> Self {
        Self {
            http,
            client_id: credentials.client_id().to_string(),
            auth: credentials.auth().clone(),
            token_url: token_url.into(),
            cached: Mutex::new(None),
        }
    }

    /// Whether a rejected token can be replaced by a fresh one.
    #[must_use]
    pub const fn can_refresh(&self) -> bool {
        matches!(self.auth, TwitchAuth::ClientCredentials { .. })
    }

    /// Current bearer token, requesting a new one if needed.
    ///
    /// # Errors
    ///
    /// Returns `HelixError::Token` if the token endpoint fails.
    pub async fn token(&self) -> Result<String, HelixError> {
        let client_secret = match &self.auth {
            TwitchAuth::StaticToken(token) => return Ok(token.clone()),
            TwitchAuth::ClientCredentials { client_secret } => client_secret,
        };

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let result = self.request_token(client_secret).await;
        metrics::record_token_refresh(result.is_ok());
        let token = result?;

        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drop a token Helix rejected.
    ///
    /// The cache is only cleared if it still holds `rejected`, so a token
    /// refreshed by another request in the meantime survives.
    pub async fn invalidate(&self, rejected: &str) {
        let mut cached = self.cached.lock().await;
        if cached.as_ref().is_some_and(|t| t.value == rejected) {
            tracing::info!("Discarding rejected app access token");
            *cached = None;
        }
    }

    async fn request_token(&self, client_secret: &str) -> Result<CachedToken, HelixError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", client_secret),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| HelixError::Token(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HelixError::Token(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<HelixErrorResponse>(&body)
                .map_or(body, HelixErrorResponse::into_message);
            tracing::error!(status = status.as_u16(), %message, "App access token request failed");
            return Err(HelixError::Token(format!("{}: {message}", status.as_u16())));
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| HelixError::Token(e.to_string()))?;

        tracing::info!(
            expires_in_secs = token.expires_in,
            "Obtained app access token"
        );

        Ok(CachedToken {
            value: token.access_token,
            expires_at: expiry(Instant::now(), token.expires_in),
        })
    }
}

/// When a token issued at `now` with `expires_in` seconds should be replaced.
fn expiry(now: Instant, expires_in: u64) -> Instant {
    let lifetime = Duration::from_secs(expires_in)
        .min(MAX_TOKEN_LIFETIME)
        .saturating_sub(EXPIRY_MARGIN);
    now.checked_add(lifetime).unwrap_or(now)
}
