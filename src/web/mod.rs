//! Web server module
//!
//! Provides the HTTP API for affiliate-search.

mod extract;
mod handlers;
mod routes;
mod state;

pub use extract::SearchPayload;
pub use routes::create_router;
pub use state::AppState;
