//! Game Model
//!
//! A trimmed view of a Helix game, tagged with whether the user picked it.

use serde::Serialize;

/// A game as shown in the curation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    /// Twitch game (category) ID.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Box art URL template with `{width}x{height}` placeholders.
    pub box_art_url: String,
    /// Whether the user explicitly asked for this game.
    pub selected: bool,
}

impl Game {
    /// Create a new game.
    #[must_use]
    pub fn new(
        id: u64,
        name: impl Into<String>,
        box_art_url: impl Into<String>,
        selected: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            box_art_url: box_art_url.into(),
            selected,
        }
    }
}
