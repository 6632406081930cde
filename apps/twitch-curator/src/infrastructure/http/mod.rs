//! HTTP/REST API adapter.
//!
//! Inbound adapter serving the `/api` routes and the front-end build.

mod controller;
mod error;
mod response;

pub use controller::{AppState, create_router, current_username};
pub use error::ApiError;
pub use response::*;
