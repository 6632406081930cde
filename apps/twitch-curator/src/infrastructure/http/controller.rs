//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to the game and stream services.
//! Anything outside `/api` is served from the front-end build directory.

use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{MatchedPath, RawQuery, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::application::ports::HelixPort;
use crate::application::services::{GameCatalog, StreamDirectory};
use crate::domain::game::Game;
use crate::domain::query::{
    ComboQuery, QueryParams, SpecificGamesQuery, StreamsByGameQuery, TopGamesQuery,
    TopStreamsQuery, UserDetailsQuery,
};
use crate::domain::stream::Stream;
use crate::infrastructure::metrics;

use super::error::ApiError;
use super::response::UsernameResponse;

/// Application state shared across handlers.
pub struct AppState<H>
where
    H: HelixPort,
{
    /// Game list use cases.
    pub games: GameCatalog<H>,
    /// Stream list use cases.
    pub streams: StreamDirectory<H>,
    /// Reported by `/api/getUsername`.
    pub username: Arc<str>,
}

impl<H> Clone for AppState<H>
where
    H: HelixPort,
{
    fn clone(&self) -> Self {
        Self {
            games: self.games.clone(),
            streams: self.streams.clone(),
            username: Arc::clone(&self.username),
        }
    }
}

impl<H> AppState<H>
where
    H: HelixPort,
{
    /// Build the services around one Helix port.
    pub fn new(helix: Arc<H>, username: impl Into<Arc<str>>) -> Self {
        Self {
            games: GameCatalog::new(Arc::clone(&helix)),
            streams: StreamDirectory::new(helix),
            username: username.into(),
        }
    }
}

/// Name of the OS user running the server.
///
/// Asks the OS account database first; `USER`, `USERNAME` and `LOGNAME`
/// are only consulted when that lookup fails.
#[must_use]
pub fn current_username() -> String {
    username_from(whoami::fallible::username().ok(), |key| std::env::var(key).ok())
}

fn username_from<F>(os_user: Option<String>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    os_user
        .filter(|name| !name.is_empty())
        .or_else(|| {
            ["USER", "USERNAME", "LOGNAME"]
                .iter()
                .find_map(|key| lookup(key).filter(|v| !v.is_empty()))
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Create the HTTP router with all endpoints.
pub fn create_router<H>(state: AppState<H>, static_dir: &Path) -> Router
where
    H: HelixPort + 'static,
{
    Router::new()
        .route("/api/games", get(games_home))
        .route("/api/games/top", get(top_games::<H>))
        .route("/api/games/specific", get(specific_games::<H>))
        .route("/api/games/combo", get(combo_games::<H>))
        .route("/api/streams/details", get(stream_details::<H>))
        .route("/api/streams/games", get(streams_for_games::<H>))
        .route("/api/streams/top", get(top_streams::<H>))
        .route("/api/getUsername", get(username::<H>))
        .route_layer(middleware::from_fn(record_request))
        .with_state(state)
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}

async fn record_request(matched: MatchedPath, request: Request, next: Next) -> Response {
    let route = matched.as_str().to_owned();
    let response = next.run(request).await;
    metrics::record_api_request(&route, response.status().as_u16());
    response
}

fn params(raw: Option<String>) -> QueryParams {
    QueryParams::parse(raw.as_deref())
}

async fn games_home() -> &'static str {
    "games home"
}

/// Top games endpoint.
async fn top_games<H>(
    State(state): State<AppState<H>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Game>>, ApiError>
where
    H: HelixPort,
{
    let query = TopGamesQuery::from_params(&params(raw))?;
    Ok(Json(state.games.top_games(&query).await?))
}

/// Specific games endpoint.
async fn specific_games<H>(
    State(state): State<AppState<H>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Game>>, ApiError>
where
    H: HelixPort,
{
    let query = SpecificGamesQuery::from_params(&params(raw))?;
    Ok(Json(state.games.specific_games(&query).await?))
}

/// Selected plus top games endpoint.
async fn combo_games<H>(
    State(state): State<AppState<H>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Game>>, ApiError>
where
    H: HelixPort,
{
    let query = ComboQuery::from_params(&params(raw))?;
    Ok(Json(state.games.combo_games(&query).await?))
}

/// Streamer details endpoint.
async fn stream_details<H>(
    State(state): State<AppState<H>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Stream>>, ApiError>
where
    H: HelixPort,
{
    let query = UserDetailsQuery::from_params(&params(raw))?;
    Ok(Json(state.streams.stream_details(&query).await?))
}

/// Streams for games endpoint.
async fn streams_for_games<H>(
    State(state): State<AppState<H>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Stream>>, ApiError>
where
    H: HelixPort,
{
    let query = StreamsByGameQuery::from_params(&params(raw))?;
    Ok(Json(state.streams.streams_for_games(&query).await?))
}

/// Top streams endpoint.
async fn top_streams<H>(
    State(state): State<AppState<H>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Stream>>, ApiError>
where
    H: HelixPort,
{
    let query = TopStreamsQuery::from_params(&params(raw))?;
    Ok(Json(state.streams.top_streams(&query).await?))
}

async fn username<H>(State(state): State<AppState<H>>) -> Json<UsernameResponse>
where
    H: HelixPort,
{
    Json(UsernameResponse {
        username: state.username.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::application::ports::{
        GameRecord, HelixError, StreamFilter, StreamRecord, UserRecord,
    };
    use crate::domain::query::Pagination;

    // Canned Helix
    #[derive(Default)]
    struct StubHelix {
        calls: AtomicUsize,
        fail_with: Option<HelixError>,
    }

    impl StubHelix {
        fn result<T>(&self, value: Vec<T>) -> Result<Vec<T>, HelixError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.fail_with.clone().map_or(Ok(value), Err)
        }
    }

    fn game(id: &str, name: &str) -> GameRecord {
        GameRecord {
            id: id.to_string(),
            name: name.to_string(),
            box_art_url: String::new(),
        }
    }

    #[async_trait]
    impl HelixPort for StubHelix {
        async fn top_games(&self, _page: &Pagination) -> Result<Vec<GameRecord>, HelixError> {
            self.result(vec![game("10", "Top"), game("20", "Both")])
        }

        async fn games(
            &self,
            _ids: &[u64],
            _names: &[String],
        ) -> Result<Vec<GameRecord>, HelixError> {
            self.result(vec![game("20", "Both")])
        }

        async fn streams(&self, filter: &StreamFilter) -> Result<Vec<StreamRecord>, HelixError> {
            let game_id = filter
                .game_ids
                .first()
                .map_or_else(String::new, ToString::to_string);
            self.result(vec![StreamRecord {
                user_id: "7".to_string(),
                user_login: "seven".to_string(),
                user_name: "Seven".to_string(),
                game_id,
                language: "en".to_string(),
                viewer_count: 70,
            }])
        }

        async fn users(
            &self,
            _ids: &[u64],
            _logins: &[String],
        ) -> Result<Vec<UserRecord>, HelixError> {
            self.result(vec![UserRecord {
                id: "12826".to_string(),
                login: "twitch".to_string(),
                display_name: "Twitch".to_string(),
            }])
        }
    }

    fn app(helix: Arc<StubHelix>) -> Router {
        create_router(
            AppState::new(helix, "tester"),
            Path::new("does-not-exist"),
        )
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn games_home_is_text() {
        let response = app(Arc::default())
            .oneshot(Request::builder().uri("/api/games").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"games home");
    }

    #[tokio::test]
    async fn top_games_returns_numeric_ids() {
        let (status, json) = fetch(app(Arc::default()), "/api/games/top?first=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["id"], 10);
        assert_eq!(json[0]["selected"], false);
    }

    #[tokio::test]
    async fn combo_puts_selected_first() {
        let (status, json) = fetch(app(Arc::default()), "/api/games/combo?name=Both").await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<u64> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![20, 10]);
        assert_eq!(json[0]["selected"], true);
    }

    #[tokio::test]
    async fn specific_without_selector_skips_upstream() {
        let helix = Arc::new(StubHelix::default());
        let (status, json) = fetch(app(Arc::clone(&helix)), "/api/games/specific").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
        assert_eq!(helix.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_first_is_bad_request() {
        let helix = Arc::new(StubHelix::default());
        let (status, json) = fetch(app(Arc::clone(&helix)), "/api/games/top?first=500").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
        assert_eq!(helix.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn streams_by_game_keeps_game_id() {
        let (status, json) = fetch(app(Arc::default()), "/api/streams/games?game_id=33214").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["user_id"], 7);
        assert_eq!(json[0]["game_id"], 33214);
    }

    #[tokio::test]
    async fn details_return_subset() {
        let (status, json) = fetch(app(Arc::default()), "/api/streams/details?login=twitch").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([{"user_id": 12826, "login": "twitch"}]));
    }

    #[tokio::test]
    async fn top_streams_without_filters() {
        let (status, json) = fetch(app(Arc::default()), "/api/streams/top").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway() {
        let helix = Arc::new(StubHelix {
            fail_with: Some(HelixError::Network("refused".to_string())),
            ..StubHelix::default()
        });
        let (status, json) = fetch(app(helix), "/api/games/top").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].as_str().unwrap().contains("refused"));
    }

    #[tokio::test]
    async fn username_is_reported() {
        let (status, json) = fetch(app(Arc::default()), "/api/getUsername").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({"username": "tester"}));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (status, _) = fetch(app(Arc::default()), "/missing.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn username_resolves_without_environment() {
        let name = username_from(whoami::fallible::username().ok(), |_| None);
        assert_ne!(name, "unknown");

        if cfg!(unix)
            && let Ok(output) = std::process::Command::new("id").arg("-un").output()
            && output.status.success()
        {
            assert_eq!(name, String::from_utf8_lossy(&output.stdout).trim());
        }
    }

    #[test]
    fn username_falls_back_to_environment() {
        let name = username_from(None, |key| (key == "LOGNAME").then(|| "svc".to_string()));
        assert_eq!(name, "svc");

        let name = username_from(Some(String::new()), |key| {
            (key == "USER").then(|| "deploy".to_string())
        });
        assert_eq!(name, "deploy");
    }

    #[test]
    fn username_unknown_when_nothing_resolves() {
        assert_eq!(username_from(None, |_| None), "unknown");
        assert_eq!(username_from(None, |_| Some(String::new())), "unknown");
    }

    #[test]
    fn os_user_wins_over_environment() {
        let name = username_from(Some("alice".to_string()), |_| Some("spoofed".to_string()));
        assert_eq!(name, "alice");
    }
}
