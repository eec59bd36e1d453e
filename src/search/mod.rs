//! Search dispatch module
//!
//! Sends validated requests to the selected provider and turns the
//! outcome into a status and body.

mod envelope;
mod executor;
mod models;

pub use envelope::{relay, Relayed};
pub use executor::Dispatcher;
pub use models::*;
