//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the application services and port interfaces
//! that define how the domain interacts with the Helix API.

/// Port interfaces for external systems (Helix).
pub mod ports;

/// Application services for games and streams.
pub mod services;
