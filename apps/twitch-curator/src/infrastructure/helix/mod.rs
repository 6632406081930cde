//! Twitch Helix Adapter
//!
//! Implementation of `HelixPort` for the Twitch Helix REST API with:
//! - `Client-Id` and bearer token headers on every call
//! - Static tokens or cached app access tokens (client-credentials grant)
//! - Retry logic with exponential backoff
//! - One token refresh and re-send after a 401

mod adapter;
mod api_types;
mod auth;
mod http_client;

pub use adapter::HelixAdapter;
pub use auth::TokenProvider;
pub use http_client::HelixHttpClient;
