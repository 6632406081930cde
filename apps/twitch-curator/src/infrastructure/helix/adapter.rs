//! Helix adapter implementing `HelixPort`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{
    GameRecord, HelixError, HelixPort, StreamFilter, StreamRecord, UserRecord,
};
use crate::domain::query::Pagination;
use crate::infrastructure::config::{Credentials, HelixSettings};
use crate::infrastructure::health::UpstreamHealth;
use crate::infrastructure::metrics::HelixEndpoint;

use super::http_client::HelixHttpClient;

type QueryPairs = Vec<(&'static str, String)>;

/// Twitch Helix adapter.
///
/// Implements `HelixPort` by translating calls into Helix query strings.
#[derive(Debug, Clone)]
pub struct HelixAdapter {
    client: HelixHttpClient,
}

impl HelixAdapter {
    /// Create a new Helix adapter.
    ///
    /// # Errors
    ///
    /// Returns `HelixError` if the HTTP client cannot be built.
    pub fn new(credentials: &Credentials, settings: &HelixSettings) -> Result<Self, HelixError> {
        Ok(Self {
            client: HelixHttpClient::new(credentials, settings)?,
        })
    }

    /// Outcome tracker for the health server.
    #[must_use]
    pub fn upstream_health(&self) -> Arc<UpstreamHealth> {
        self.client.upstream_health()
    }
}

fn push_all<T: ToString>(pairs: &mut QueryPairs, key: &'static str, values: &[T]) {
    pairs.extend(values.iter().map(|v| (key, v.to_string())));
}

fn push_page(pairs: &mut QueryPairs, page: &Pagination) {
    if let Some(first) = page.first {
        pairs.push(("first", first.to_string()));
    }
    if let Some(after) = &page.after {
        pairs.push(("after", after.clone()));
    }
}

fn top_games_query(page: &Pagination) -> QueryPairs {
    let mut pairs = Vec::new();
    push_page(&mut pairs, page);
    pairs
}

fn games_query(ids: &[u64], names: &[String]) -> QueryPairs {
    let mut pairs = Vec::with_capacity(ids.len() + names.len());
    push_all(&mut pairs, "id", ids);
    push_all(&mut pairs, "name", names);
    pairs
}

fn streams_query(filter: &StreamFilter) -> QueryPairs {
    let mut pairs = Vec::new();
    push_all(&mut pairs, "game_id", &filter.game_ids);
    push_all(&mut pairs, "language", &filter.languages);
    push_page(&mut pairs, &filter.page);
    pairs
}

fn users_query(ids: &[u64], logins: &[String]) -> QueryPairs {
    let mut pairs = Vec::with_capacity(ids.len() + logins.len());
    push_all(&mut pairs, "id", ids);
    push_all(&mut pairs, "login", logins);
    pairs
}

#[async_trait]
impl HelixPort for HelixAdapter {
    async fn top_games(&self, page: &Pagination) -> Result<Vec<GameRecord>, HelixError> {
        self.client
            .get(HelixEndpoint::TopGames, &top_games_query(page))
            .await
    }

    async fn games(&self, ids: &[u64], names: &[String]) -> Result<Vec<GameRecord>, HelixError> {
        self.client
            .get(HelixEndpoint::Games, &games_query(ids, names))
            .await
    }

    async fn streams(&self, filter: &StreamFilter) -> Result<Vec<StreamRecord>, HelixError> {
        self.client
            .get(HelixEndpoint::Streams, &streams_query(filter))
            .await
    }

    async fn users(&self, ids: &[u64], logins: &[String]) -> Result<Vec<UserRecord>, HelixError> {
        self.client
            .get(HelixEndpoint::Users, &users_query(ids, logins))
            .await
    }
}
