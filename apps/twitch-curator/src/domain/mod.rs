//! Domain Layer - Curation models and query types.
//!
//! This layer contains the lightweight models returned to the front-end
//! and the typed querystring options accepted by each route. Nothing here
//! performs I/O.

/// Deduplication and merging of model lists.
pub mod dedup;

/// Game model.
pub mod game;

/// Typed querystring options and validation.
pub mod query;

/// Stream model.
pub mod stream;
