//! Shared setup for API integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::MockServer;

use twitch_curator::{
    AppState, Credentials, HelixAdapter, HelixSettings, RetrySettings, TwitchAuth, create_router,
};

/// Front-end build used by the static file tests.
pub fn static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/dist")
}

/// Helix settings pointing at the mock server.
pub fn helix_settings(server: &MockServer, max_attempts: u32) -> HelixSettings {
    HelixSettings {
        base_url: format!("{}/helix", server.uri()),
        token_url: format!("{}/oauth2/token", server.uri()),
        timeout: Duration::from_secs(5),
        retry: RetrySettings {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(10),
            multiplier: 2.0,
        },
    }
}

/// Router backed by the mock server with a static token.
pub fn app(server: &MockServer) -> Router {
    app_with(server, TwitchAuth::StaticToken("test-token".to_string()), 1)
}

/// Router backed by the mock server.
pub fn app_with(server: &MockServer, auth: TwitchAuth, max_attempts: u32) -> Router {
    let credentials = Credentials::new("test-client".to_string(), auth);
    let helix = HelixAdapter::new(&credentials, &helix_settings(server, max_attempts)).unwrap();
    create_router(AppState::new(Arc::new(helix), "tester"), &static_dir())
}

/// Issue a GET and return status, headers and raw body.
pub async fn get_raw(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

/// Issue a GET and parse the body as JSON.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get_raw(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Helix list envelope.
pub fn page(data: Value) -> Value {
    json!({ "data": data, "pagination": {} })
}

/// Helix game record.
pub fn game(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "box_art_url": format!("https://static-cdn.jtvnw.net/ttv-boxart/{id}-{{width}}x{{height}}.jpg"),
        "igdb_id": ""
    })
}

/// Helix stream record.
pub fn stream(user_id: &str, login: &str, game_id: &str, language: &str, viewers: u64) -> Value {
    json!({
        "id": format!("4{user_id}"),
        "user_id": user_id,
        "user_login": login,
        "user_name": login.to_uppercase(),
        "game_id": game_id,
        "game_name": "",
        "type": "live",
        "title": "title",
        "viewer_count": viewers,
        "started_at": "2024-01-01T00:00:00Z",
        "language": language,
        "thumbnail_url": "",
        "tags": [],
        "is_mature": false
    })
}

/// Helix user record.
pub fn user(id: &str, login: &str) -> Value {
    json!({
        "id": id,
        "login": login,
        "display_name": login,
        "type": "",
        "broadcaster_type": "partner",
        "description": "",
        "created_at": "2016-12-14T20:32:28Z"
    })
}

/// IDs from a JSON array of games or streams.
pub fn ids(json: &Value, key: &str) -> Vec<u64> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|item| item[key].as_u64().unwrap())
        .collect()
}
