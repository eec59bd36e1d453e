//! affiliate-search: product search across affiliate marketplaces
//!
//! Accepts one generic search request, validates it, translates it into
//! the native query of Amazon PA-API or Rakuten Ichiba, and relays the
//! provider's own result back to the caller.

pub mod config;
pub mod error;
pub mod network;
pub mod providers;
pub mod query;
pub mod search;
pub mod web;

pub use config::Settings;
pub use error::{DispatchError, SearchError, ValidationError};
pub use providers::{Provider, ProviderKind};
pub use query::{RawSearchRequest, SortOrder, ValidatedSearchRequest};
pub use search::{relay, Dispatcher, ProviderResult, Relayed};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default deadline for provider requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 10;
