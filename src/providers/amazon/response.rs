//! PA-API `SearchItems` response shapes

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Decoded `SearchItems` response.
///
/// The typed fields are a checked view of the body; serializing emits the
/// body exactly as the API sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct SearchItemsResponse {
    pub search_result: Option<SearchResult>,
    pub errors: Vec<ApiError>,
    raw: Value,
}

impl SearchItemsResponse {
    /// The body as received
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchItemsView {
    #[serde(default)]
    search_result: Option<SearchResult>,
    #[serde(default)]
    errors: Option<Vec<ApiError>>,
}

impl TryFrom<Value> for SearchItemsResponse {
    type Error = serde_json::Error;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let view = SearchItemsView::deserialize(&raw)?;
        Ok(Self {
            search_result: view.search_result,
            errors: view.errors.unwrap_or_default(),
            raw,
        })
    }
}

impl From<SearchItemsResponse> for Value {
    fn from(response: SearchItemsResponse) -> Value {
        response.raw
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResult {
    #[serde(default)]
    pub total_result_count: Option<u64>,
    #[serde(rename = "SearchURL", default)]
    pub search_url: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Item {
    #[serde(rename = "ASIN")]
    pub asin: String,
    #[serde(rename = "DetailPageURL", default)]
    pub detail_page_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Body of a non-2xx answer
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

impl ErrorEnvelope {
    pub(super) fn message(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
