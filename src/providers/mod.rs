//! Marketplace provider module
//!
//! Defines the Provider trait and the two marketplace implementations.

mod traits;

pub mod amazon;
pub mod rakuten;

pub use amazon::Amazon;
pub use rakuten::Rakuten;
pub use traits::*;
