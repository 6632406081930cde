//! Curator Configuration Settings
//!
//! Configuration types for the curator service, loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Default Helix API base URL.
pub const DEFAULT_HELIX_URL: &str = "https://api.twitch.tv/helix";

/// Default OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Shortest accepted upstream timeout; reqwest fails every call at zero.
const MIN_TIMEOUT: Duration = Duration::from_secs(1);

/// How the service authenticates against Helix.
#[derive(Clone, PartialEq, Eq)]
pub enum TwitchAuth {
    /// A pre-issued bearer token.
    StaticToken(String),
    /// App access token obtained with the client-credentials grant.
    ClientCredentials {
        /// Application client secret.
        client_secret: String,
    },
}

impl std::fmt::Debug for TwitchAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaticToken(_) => f.debug_tuple("StaticToken").field(&"[REDACTED]").finish(),
            Self::ClientCredentials { .. } => f
                .debug_struct("ClientCredentials")
                .field("client_secret", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Twitch application credentials.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    auth: TwitchAuth,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(client_id: String, auth: TwitchAuth) -> Self {
        Self { client_id, auth }
    }

    /// Get the client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Get the authentication mode.
    #[must_use]
    pub const fn auth(&self) -> &TwitchAuth {
        &self.auth
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &"[REDACTED]")
            .field("auth", &self.auth)
            .finish()
    }
}

/// Helix HTTP client settings.
#[derive(Debug, Clone)]
pub struct HelixSettings {
    /// Helix API base URL (no trailing slash).
    pub base_url: String,
    /// OAuth token endpoint.
    pub token_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy.
    pub retry: RetrySettings,
}

impl Default for HelixSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HELIX_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(10),
            retry: RetrySettings::default(),
        }
    }
}

/// Retry policy for upstream calls.
#[derive(Debug, Clone)]
pub struct RetrySettings {
    /// Attempts per call, including the first (1 = no retry).
    pub max_attempts: u32,
    /// First backoff delay.
    pub initial_backoff: Duration,
    /// Backoff cap.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// API and static file port.
    pub port: u16,
    /// Health check and metrics port (0 = disabled).
    pub health_port: u16,
    /// Directory holding the front-end build.
    pub static_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            health_port: 8082,
            static_dir: PathBuf::from("dist"),
        }
    }
}

/// Complete curator configuration.
#[derive(Debug, Clone)]
pub struct CuratorConfig {
    /// Twitch credentials.
    pub credentials: Credentials,
    /// Helix client settings.
    pub helix: HelixSettings,
    /// Server settings.
    pub server: ServerSettings,
}

impl CuratorConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup("TWITCH_CLIENT_ID")
            .ok_or_else(|| ConfigError::MissingEnvVar("TWITCH_CLIENT_ID".to_string()))?;
        if client_id.is_empty() {
            return Err(ConfigError::EmptyValue("TWITCH_CLIENT_ID".to_string()));
        }

        let auth = match (lookup("TWITCH_ACCESS_TOKEN"), lookup("TWITCH_CLIENT_SECRET")) {
            (Some(token), _) if !token.is_empty() => TwitchAuth::StaticToken(token),
            (_, Some(secret)) if !secret.is_empty() => TwitchAuth::ClientCredentials {
                client_secret: secret,
            },
            (Some(_), _) => return Err(ConfigError::EmptyValue("TWITCH_ACCESS_TOKEN".to_string())),
            (_, Some(_)) => {
                return Err(ConfigError::EmptyValue("TWITCH_CLIENT_SECRET".to_string()));
            }
            (None, None) => {
                return Err(ConfigError::MissingEnvVar(
                    "TWITCH_ACCESS_TOKEN or TWITCH_CLIENT_SECRET".to_string(),
                ));
            }
        };

        let helix_defaults = HelixSettings::default();
        let retry_defaults = RetrySettings::default();
        let helix = HelixSettings {
            base_url: lookup("TWITCH_HELIX_URL")
                .filter(|v| !v.is_empty())
                .map_or(helix_defaults.base_url, |v| v.trim_end_matches('/').to_string()),
            token_url: lookup("TWITCH_TOKEN_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or(helix_defaults.token_url),
            timeout: parse_duration_secs(&lookup, "TWITCH_TIMEOUT_SECS", helix_defaults.timeout)
                .max(MIN_TIMEOUT),
            retry: RetrySettings {
                max_attempts: parse_or(&lookup, "TWITCH_MAX_ATTEMPTS", retry_defaults.max_attempts)
                    .max(1),
                initial_backoff: parse_duration_millis(
                    &lookup,
                    "TWITCH_RETRY_INITIAL_MS",
                    retry_defaults.initial_backoff,
                ),
                max_backoff: parse_duration_secs(
                    &lookup,
                    "TWITCH_RETRY_MAX_SECS",
                    retry_defaults.max_backoff,
                ),
                multiplier: retry_defaults.multiplier,
            },
        };

        let server_defaults = ServerSettings::default();
        let server = ServerSettings {
            port: parse_or(&lookup, "PORT", server_defaults.port),
            health_port: parse_or(&lookup, "CURATOR_HEALTH_PORT", server_defaults.health_port),
            static_dir: lookup("CURATOR_STATIC_DIR")
                .filter(|v| !v.is_empty())
                .map_or(server_defaults.static_dir, PathBuf::from),
        };

        Ok(Self {
            credentials: Credentials::new(client_id, auth),
            helix,
            server,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_duration_secs<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn parse_duration_millis<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn static_token_config() {
        let config = CuratorConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "client"),
            ("TWITCH_ACCESS_TOKEN", "token"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.client_id(), "client");
        assert_eq!(
            config.credentials.auth(),
            &TwitchAuth::StaticToken("token".to_string())
        );
        assert_eq!(config.helix.base_url, DEFAULT_HELIX_URL);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn client_secret_config() {
        let config = CuratorConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "client"),
            ("TWITCH_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();

        assert!(matches!(
            config.credentials.auth(),
            TwitchAuth::ClientCredentials { .. }
        ));
    }

    #[test]
    fn static_token_takes_precedence() {
        let config = CuratorConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "client"),
            ("TWITCH_ACCESS_TOKEN", "token"),
            ("TWITCH_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();

        assert!(matches!(
            config.credentials.auth(),
            TwitchAuth::StaticToken(_)
        ));
    }

    #[test]
    fn missing_client_id() {
        let err = CuratorConfig::from_lookup(lookup(&[("TWITCH_ACCESS_TOKEN", "token")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "TWITCH_CLIENT_ID"));
    }

    #[test]
    fn empty_client_id() {
        let err = CuratorConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", ""),
            ("TWITCH_ACCESS_TOKEN", "token"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue(_)));
    }

    #[test]
    fn missing_auth() {
        let err = CuratorConfig::from_lookup(lookup(&[("TWITCH_CLIENT_ID", "client")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn empty_token() {
        let err = CuratorConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "client"),
            ("TWITCH_ACCESS_TOKEN", ""),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue(ref k) if k == "TWITCH_ACCESS_TOKEN"));
    }

    #[test]
    fn overrides_are_applied() {
        let config = CuratorConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "client"),
            ("TWITCH_ACCESS_TOKEN", "token"),
            ("TWITCH_HELIX_URL", "http://127.0.0.1:9999/helix/"),
            ("TWITCH_TIMEOUT_SECS", "3"),
            ("TWITCH_MAX_ATTEMPTS", "4"),
            ("TWITCH_RETRY_INITIAL_MS", "50"),
            ("PORT", "3000"),
            ("CURATOR_HEALTH_PORT", "0"),
            ("CURATOR_STATIC_DIR", "public"),
        ]))
        .unwrap();

        assert_eq!(config.helix.base_url, "http://127.0.0.1:9999/helix");
        assert_eq!(config.helix.timeout, Duration::from_secs(3));
        assert_eq!(config.helix.retry.max_attempts, 4);
        assert_eq!(config.helix.retry.initial_backoff, Duration::from_millis(50));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.health_port, 0);
        assert_eq!(config.server.static_dir, PathBuf::from("public"));
    }

    #[test]
    fn zero_attempts_clamped_to_one() {
        let config = CuratorConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "client"),
            ("TWITCH_ACCESS_TOKEN", "token"),
            ("TWITCH_MAX_ATTEMPTS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.helix.retry.max_attempts, 1);
    }

    #[test]
    fn zero_timeout_clamped_to_one_second() {
        let config = CuratorConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "client"),
            ("TWITCH_ACCESS_TOKEN", "token"),
            ("TWITCH_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.helix.timeout, Duration::from_secs(1));
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = CuratorConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "client"),
            ("TWITCH_ACCESS_TOKEN", "token"),
            ("PORT", "not-a-port"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn credentials_redacted_debug() {
        let creds = Credentials::new(
            "client123".to_string(),
            TwitchAuth::ClientCredentials {
                client_secret: "secret456".to_string(),
            },
        );
        let debug = format!("{creds:?}");
        assert!(!debug.contains("client123"));
        assert!(!debug.contains("secret456"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn retry_settings_defaults() {
        let settings = RetrySettings::default();
        assert_eq!(settings.max_attempts, 1);
        assert_eq!(settings.initial_backoff, Duration::from_millis(200));
        assert_eq!(settings.max_backoff, Duration::from_secs(5));
    }

    #[test]
    fn server_settings_defaults() {
        let settings = ServerSettings::default();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.health_port, 8082);
        assert_eq!(settings.static_dir, PathBuf::from("dist"));
    }
}
