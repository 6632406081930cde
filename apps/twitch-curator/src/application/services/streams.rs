//! Stream Directory Service

use std::sync::Arc;

use crate::application::ports::{HelixError, HelixPort, StreamFilter, StreamRecord, UserRecord};
use crate::domain::query::{StreamsByGameQuery, TopStreamsQuery, UserDetailsQuery};
use crate::domain::stream::Stream;

use super::parse_id;

/// Map a Helix stream record to a `Stream`.
///
/// # Errors
///
/// Returns `HelixError::InvalidRecord` if the user ID, or a non-empty game
/// ID, is not numeric.
pub fn stream_from_record(record: StreamRecord) -> Result<Stream, HelixError> {
    let login = if record.user_login.is_empty() {
        record.user_name.to_lowercase()
    } else {
        record.user_login
    };

    Ok(Stream {
        user_id: parse_id("user", &record.user_id)?,
        login,
        game_id: if record.game_id.is_empty() {
            None
        } else {
            Some(parse_id("game", &record.game_id)?)
        },
        language: Some(record.language).filter(|l| !l.is_empty()),
        viewer_count: Some(record.viewer_count),
    })
}

/// Map a Helix user record to the `{user_id, login}` details subset.
///
/// # Errors
///
/// Returns `HelixError::InvalidRecord` if the ID is not numeric.
pub fn stream_from_user(record: UserRecord) -> Result<Stream, HelixError> {
    Ok(Stream::details(parse_id("user", &record.id)?, record.login))
}

/// Use case for listing streams and streamer details.
pub struct StreamDirectory<H>
where
    H: HelixPort,
{
    helix: Arc<H>,
}

impl<H> Clone for StreamDirectory<H>
where
    H: HelixPort,
{
    fn clone(&self) -> Self {
        Self {
            helix: Arc::clone(&self.helix),
        }
    }
}

impl<H> StreamDirectory<H>
where
    H: HelixPort,
{
    /// Create a new `StreamDirectory`.
    pub const fn new(helix: Arc<H>) -> Self {
        Self { helix }
    }

    /// Live streams for the given games.
    ///
    /// Returns nothing when no game is given; an unfiltered Helix query
    /// would list every live stream instead.
    ///
    /// # Errors
    ///
    /// Returns `HelixError` if the upstream call or mapping fails.
    pub async fn streams_for_games(
        &self,
        query: &StreamsByGameQuery,
    ) -> Result<Vec<Stream>, HelixError> {
        if query.game_ids.is_empty() {
            return Ok(Vec::new());
        }

        let filter = StreamFilter {
            game_ids: query.game_ids.clone(),
            languages: query.languages.clone(),
            page: query.page.clone(),
        };

        self.fetch_streams(&filter).await
    }

    /// Live streams across all games.
    ///
    /// # Errors
    ///
    /// Returns `HelixError` if the upstream call or mapping fails.
    pub async fn top_streams(&self, query: &TopStreamsQuery) -> Result<Vec<Stream>, HelixError> {
        let filter = StreamFilter {
            game_ids: Vec::new(),
            languages: query.languages.clone(),
            page: query.page.clone(),
        };

        self.fetch_streams(&filter).await
    }

    /// `{user_id, login}` for the named users.
    ///
    /// # Errors
    ///
    /// Returns `HelixError` if the upstream call or mapping fails.
    pub async fn stream_details(&self, query: &UserDetailsQuery) -> Result<Vec<Stream>, HelixError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.helix.users(&query.ids, &query.logins).await?;
        users.into_iter().map(stream_from_user).collect()
    }

    async fn fetch_streams(&self, filter: &StreamFilter) -> Result<Vec<Stream>, HelixError> {
        let records = self.helix.streams(filter).await?;
        let streams = records
            .into_iter()
            .map(stream_from_record)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            games = filter.game_ids.len(),
            languages = filter.languages.len(),
            count = streams.len(),
            "Fetched streams"
        );
        Ok(streams)
    }
}
