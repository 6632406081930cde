//! Configuration Module
//!
//! Configuration loading for the curator service.

mod settings;

pub use settings::{
    ConfigError, Credentials, CuratorConfig, DEFAULT_HELIX_URL, DEFAULT_TOKEN_URL, HelixSettings,
    RetrySettings, ServerSettings, TwitchAuth,
};
