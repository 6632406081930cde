//! Game Catalog Service

use std::sync::Arc;

use crate::application::ports::{GameRecord, HelixError, HelixPort};
use crate::domain::dedup::{merge_without_duplicates, remove_duplicates};
use crate::domain::game::Game;
use crate::domain::query::{ComboQuery, SpecificGamesQuery, TopGamesQuery};

use super::parse_id;

/// Map a Helix game record to a `Game`.
///
/// # Errors
///
/// Returns `HelixError::InvalidRecord` if the ID is not numeric.
pub fn game_from_record(record: GameRecord, selected: bool) -> Result<Game, HelixError> {
    Ok(Game {
        id: parse_id("game", &record.id)?,
        name: record.name,
        box_art_url: record.box_art_url,
        selected,
    })
}

fn games_from_records(records: Vec<GameRecord>, selected: bool) -> Result<Vec<Game>, HelixError> {
    let games = records
        .into_iter()
        .map(|record| game_from_record(record, selected))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(remove_duplicates(games, |game| game.id))
}

/// Use case for building game lists.
pub struct GameCatalog<H>
where
    H: HelixPort,
{
    helix: Arc<H>,
}

impl<H> Clone for GameCatalog<H>
where
    H: HelixPort,
{
    fn clone(&self) -> Self {
        Self {
            helix: Arc::clone(&self.helix),
        }
    }
}

impl<H> GameCatalog<H>
where
    H: HelixPort,
{
    /// Create a new `GameCatalog`.
    pub const fn new(helix: Arc<H>) -> Self {
        Self { helix }
    }

    /// Current top games, unselected.
    ///
    /// Skips the upstream call when the caller opted out of top games.
    ///
    /// # Errors
    ///
    /// Returns `HelixError` if the upstream call or mapping fails.
    pub async fn top_games(&self, query: &TopGamesQuery) -> Result<Vec<Game>, HelixError> {
        if query.is_excluded() {
            return Ok(Vec::new());
        }

        let records = self.helix.top_games(&query.page).await?;
        let games = games_from_records(records, false)?;
        tracing::debug!(count = games.len(), "Fetched top games");
        Ok(games)
    }

    /// Games the user named, marked selected.
    ///
    /// # Errors
    ///
    /// Returns `HelixError` if the upstream call or mapping fails.
    pub async fn specific_games(
        &self,
        query: &SpecificGamesQuery,
    ) -> Result<Vec<Game>, HelixError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.helix.games(&query.ids, &query.names).await?;
        let games = games_from_records(records, true)?;
        tracing::debug!(
            requested = query.ids.len() + query.names.len(),
            found = games.len(),
            "Fetched specific games"
        );
        Ok(games)
    }

    /// Selected games followed by top games not already selected.
    ///
    /// Both upstream calls run concurrently; either failing fails the whole
    /// request.
    ///
    /// # Errors
    ///
    /// Returns `HelixError` if either upstream call fails.
    pub async fn combo_games(&self, query: &ComboQuery) -> Result<Vec<Game>, HelixError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let (specific, top) = tokio::try_join!(
            self.specific_games(&query.specific),
            self.top_games(&query.top)
        )?;

        Ok(merge_without_duplicates(specific, top, |game| game.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockHelixPort;
    use crate::domain::query::Pagination;

    fn record(id: &str, name: &str) -> GameRecord {
        GameRecord {
            id: id.to_string(),
            name: name.to_string(),
            box_art_url: format!("https://static-cdn.jtvnw.net/ttv-boxart/{id}-{{width}}x{{height}}.jpg"),
        }
    }

    #[test]
    fn game_from_record_parses_id() {
        let game = game_from_record(record("394568", "RimWorld"), true).unwrap();
        assert_eq!(game.id, 394_568);
        assert_eq!(game.name, "RimWorld");
        assert!(game.selected);
    }

    #[test]
    fn game_from_record_rejects_bad_id() {
        let err = game_from_record(record("abc", "Broken"), false).unwrap_err();
        assert!(matches!(err, HelixError::InvalidRecord(_)));
    }

    #[tokio::test]
    async fn top_games_unselected_and_deduplicated() {
        let mut helix = MockHelixPort::new();
        helix.expect_top_games().times(1).returning(|_| {
            Ok(vec![
                record("1", "A"),
                record("2", "B"),
                record("1", "A"),
            ])
        });

        let catalog = GameCatalog::new(Arc::new(helix));
        let games = catalog.top_games(&TopGamesQuery::default()).await.unwrap();

        assert_eq!(games.len(), 2);
        assert!(games.iter().all(|g| !g.selected));
    }

    #[tokio::test]
    async fn top_games_passes_pagination() {
        let mut helix = MockHelixPort::new();
        helix
            .expect_top_games()
            .withf(|page: &Pagination| page.first == Some(4) && page.after.is_none())
            .times(1)
            .returning(|_| Ok(vec![]));

        let catalog = GameCatalog::new(Arc::new(helix));
        let query = TopGamesQuery {
            page: Pagination {
                first: Some(4),
                after: None,
            },
            include_top: None,
        };

        assert!(catalog.top_games(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn top_games_excluded_skips_upstream() {
        let mut helix = MockHelixPort::new();
        helix.expect_top_games().never();

        let catalog = GameCatalog::new(Arc::new(helix));
        let query = TopGamesQuery {
            include_top: Some(false),
            ..TopGamesQuery::default()
        };

        assert!(catalog.top_games(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn specific_games_empty_skips_upstream() {
        let mut helix = MockHelixPort::new();
        helix.expect_games().never();

        let catalog = GameCatalog::new(Arc::new(helix));
        let games = catalog
            .specific_games(&SpecificGamesQuery::default())
            .await
            .unwrap();

        assert!(games.is_empty());
    }

    #[tokio::test]
    async fn specific_games_are_selected() {
        let mut helix = MockHelixPort::new();
        helix
            .expect_games()
            .withf(|ids: &[u64], names: &[String]| ids.is_empty() && names == ["RimWorld"])
            .times(1)
            .returning(|_, _| Ok(vec![record("394568", "RimWorld")]));

        let catalog = GameCatalog::new(Arc::new(helix));
        let query = SpecificGamesQuery {
            ids: vec![],
            names: vec!["RimWorld".to_string()],
        };
        let games = catalog.specific_games(&query).await.unwrap();

        assert_eq!(games.len(), 1);
        assert!(games[0].selected);
    }

    #[tokio::test]
    async fn combo_merges_selected_first() {
        let mut helix = MockHelixPort::new();
        helix
            .expect_games()
            .times(1)
            .returning(|_, _| Ok(vec![record("20", "Selected Trending"), record("99", "Niche")]));
        helix.expect_top_games().times(1).returning(|_| {
            Ok(vec![
                record("10", "Top One"),
                record("20", "Selected Trending"),
                record("30", "Top Three"),
            ])
        });

        let catalog = GameCatalog::new(Arc::new(helix));
        let query = ComboQuery {
            specific: SpecificGamesQuery {
                ids: vec![20, 99],
                names: vec![],
            },
            top: TopGamesQuery::default(),
        };
        let games = catalog.combo_games(&query).await.unwrap();

        let ids: Vec<u64> = games.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![20, 99, 10, 30]);
        assert!(games[0].selected);
        assert!(games[1].selected);
        assert!(!games[2].selected);
    }

    #[tokio::test]
    async fn combo_empty_skips_upstream() {
        let mut helix = MockHelixPort::new();
        helix.expect_games().never();
        helix.expect_top_games().never();

        let catalog = GameCatalog::new(Arc::new(helix));
        let games = catalog.combo_games(&ComboQuery::default()).await.unwrap();

        assert!(games.is_empty());
    }

    #[tokio::test]
    async fn combo_top_only_when_requested() {
        let mut helix = MockHelixPort::new();
        helix.expect_games().never();
        helix
            .expect_top_games()
            .times(1)
            .returning(|_| Ok(vec![record("10", "Top One")]));

        let catalog = GameCatalog::new(Arc::new(helix));
        let query = ComboQuery {
            specific: SpecificGamesQuery::default(),
            top: TopGamesQuery {
                include_top: Some(true),
                ..TopGamesQuery::default()
            },
        };
        let games = catalog.combo_games(&query).await.unwrap();

        assert_eq!(games.len(), 1);
        assert!(!games[0].selected);
    }

    #[tokio::test]
    async fn combo_propagates_upstream_error() {
        let mut helix = MockHelixPort::new();
        helix
            .expect_games()
            .returning(|_, _| Ok(vec![record("1", "A")]));
        helix.expect_top_games().returning(|_| {
            Err(HelixError::Status {
                status: 500,
                message: "boom".to_string(),
            })
        });

        let catalog = GameCatalog::new(Arc::new(helix));
        let query = ComboQuery {
            specific: SpecificGamesQuery {
                ids: vec![1],
                names: vec![],
            },
            top: TopGamesQuery::default(),
        };

        let err = catalog.combo_games(&query).await.unwrap_err();
        assert!(matches!(err, HelixError::Status { status: 500, .. }));
    }
}
