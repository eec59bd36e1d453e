//! Search request data models

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Result ordering requested by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    /// Provider's own relevance ordering
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "price_asc")]
    PriceAscending,
    #[serde(rename = "price_desc")]
    PriceDescending,
}

impl SortOrder {
    /// Wire token for this ordering
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Default => "default",
            SortOrder::PriceAscending => "price_asc",
            SortOrder::PriceDescending => "price_desc",
        }
    }

    /// Parse a wire token. Matching is exact.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "default" => Some(SortOrder::Default),
            "price_asc" => Some(SortOrder::PriceAscending),
            "price_desc" => Some(SortOrder::PriceDescending),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search request exactly as it arrives on the wire.
///
/// Every field is optional here so that the validator, not the
/// deserializer, decides which constraint was violated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchRequest {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default, deserialize_with = "price_field")]
    pub min_price: Option<i64>,
    #[serde(default, deserialize_with = "price_field")]
    pub max_price: Option<i64>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// A price as JSON sends it, or as text from a form field
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceField {
    Number(i64),
    Text(String),
}

/// Accepts a number, a numeric string, or a blank string meaning unset
fn price_field<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<PriceField>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PriceField::Number(n)) => Ok(Some(n)),
        Some(PriceField::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid price: {:?}", text)))
        }
    }
}

impl RawSearchRequest {
    /// Request carrying only a keyword
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Default::default()
        }
    }

    pub fn with_prices(mut self, min: i64, max: i64) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }
}

/// A search request that passed validation.
///
/// Only [`RawSearchRequest::validate`] constructs this type, so every
/// instance satisfies:
/// - `keyword` is non-empty and trimmed
/// - `min_price <= max_price` whenever both are non-zero
///
/// Prices are in the major currency unit (yen); 0 means unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedSearchRequest {
    keyword: String,
    min_price: u32,
    max_price: u32,
    sort: SortOrder,
}

impl ValidatedSearchRequest {
    pub(super) fn new(keyword: String, min_price: u32, max_price: u32, sort: SortOrder) -> Self {
        Self {
            keyword,
            min_price,
            max_price,
            sort,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn min_price(&self) -> u32 {
        self.min_price
    }

    pub fn max_price(&self) -> u32 {
        self.max_price
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Lower bound, `None` when unbounded
    pub fn min_bound(&self) -> Option<u32> {
        (self.min_price > 0).then_some(self.min_price)
    }

    /// Upper bound, `None` when unbounded
    pub fn max_bound(&self) -> Option<u32> {
        (self.max_price > 0).then_some(self.max_price)
    }
}
