//! Provider traits and types

use crate::error::DispatchError;
use crate::query::ValidatedSearchRequest;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of marketplaces this service can search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Amazon,
    Rakuten,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Amazon, ProviderKind::Rakuten];

    /// Path segment and config name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Amazon => "amazon",
            ProviderKind::Rakuten => "rakuten",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Outbound HTTP request produced by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    /// URL to request, without query string
    pub url: String,
    pub method: HttpMethod,
    /// Request headers, sent in order
    pub headers: Vec<(String, String)>,
    /// Query parameters, sent in order
    pub params: Vec<(String, String)>,
    /// Raw request body
    pub body: Option<Vec<u8>>,
}

impl ProviderRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
        }
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set the raw body
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP response from a provider request
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl ProviderResponse {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, DispatchError> {
        serde_json::from_str(&self.text).map_err(|e| DispatchError::Decode(e.to_string()))
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Error for a non-success response, using the provider's message when
    /// one could be extracted from the body
    pub fn upstream_error(&self, message: Option<String>) -> DispatchError {
        let message = message.unwrap_or_else(|| {
            let text = self.text.trim();
            if text.is_empty() {
                "empty response body".to_string()
            } else {
                text.chars().take(512).collect()
            }
        });
        DispatchError::Upstream {
            status: self.status,
            message,
        }
    }
}

/// A marketplace search API.
///
/// Each provider owns its credentials, so `build` is a pure function of the
/// validated request and the provider's configuration. `request` turns the
/// query into the HTTP call (signing included) and `response` decodes what
/// comes back.
pub trait Provider: Send + Sync {
    /// Provider-native query shape
    type Query: fmt::Debug + Clone + PartialEq + Send + Sync;
    /// Decoded search result, relayed to the caller verbatim
    type Response: Serialize + DeserializeOwned + fmt::Debug + Send;

    fn kind(&self) -> ProviderKind;

    /// Map a validated request onto this provider's query. Never fails.
    fn build(&self, request: &ValidatedSearchRequest) -> Self::Query;

    /// Build the HTTP request for a query
    fn request(&self, query: &Self::Query) -> Result<ProviderRequest, DispatchError>;

    /// Decode the HTTP response
    fn response(&self, response: ProviderResponse) -> Result<Self::Response, DispatchError>;
}
