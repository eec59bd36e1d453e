//! HTTP networking module
//!
//! Provides the transport used to reach the marketplace APIs.

mod client;
#[cfg(test)]
pub mod mock;

pub use client::{HttpClient, Transport};
#[cfg(test)]
pub use mock::MockTransport;
