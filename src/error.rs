//! Error types shared by the validation, dispatch and relay layers

use crate::providers::ProviderKind;
use thiserror::Error;

/// Reasons an inbound search request is rejected before any provider is called
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("keyword is required")]
    MissingKeyword,

    #[error("{field} must be greater than or equal to 0")]
    NegativePrice { field: &'static str },

    #[error("{field} must be less than or equal to {}", u32::MAX)]
    PriceTooLarge { field: &'static str },

    #[error("minPrice ({min}) must be less than or equal to maxPrice ({max})")]
    PriceRangeInverted { min: u32, max: u32 },

    #[error("sort is invalid: {0:?} (expected one of \"default\", \"price_asc\", \"price_desc\")")]
    InvalidSort(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

/// Failures while talking to a provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Network level failure: DNS, connection reset, timeout
    #[error("{0}")]
    Transport(String),

    /// The provider answered 2xx but the payload did not match its response shape
    #[error("failed to decode provider response: {0}")]
    Decode(String),

    /// The provider answered with a non-success status
    #[error("provider returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::Transport(err.to_string())
    }
}

/// Every way a search request can end without a provider result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("provider {0} is not enabled")]
    ProviderUnavailable(ProviderKind),
}
