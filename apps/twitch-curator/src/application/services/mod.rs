//! Application Services
//!
//! Services that call the Helix port and reshape results into models.
//!
//! - `GameCatalog`: top, specific and combined game lists
//! - `StreamDirectory`: streams by game, top streams, user details

mod games;
mod streams;

pub use games::{GameCatalog, game_from_record};
pub use streams::{StreamDirectory, stream_from_record, stream_from_user};

use crate::application::ports::HelixError;

/// Parse a Helix numeric-string ID.
fn parse_id(kind: &str, raw: &str) -> Result<u64, HelixError> {
    raw.parse::<u64>()
        .map_err(|_| HelixError::InvalidRecord(format!("{kind} id '{raw}' is not numeric")))
}
