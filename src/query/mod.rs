//! Search request module
//!
//! Holds the wire shape of an inbound search request and the validation
//! that turns it into the canonical [`ValidatedSearchRequest`] every
//! provider builds its query from.

mod models;
mod validate;

pub use models::*;
