//! Search outcome models

use crate::providers::amazon::SearchItemsResponse;
use crate::providers::rakuten::IchibaItemResponse;
use crate::providers::ProviderKind;
use serde::Serialize;

/// Decoded result of one provider, serialized exactly as the provider sent it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProviderResult {
    Amazon(SearchItemsResponse),
    Rakuten(IchibaItemResponse),
}

impl ProviderResult {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderResult::Amazon(_) => ProviderKind::Amazon,
            ProviderResult::Rakuten(_) => ProviderKind::Rakuten,
        }
    }

    /// Number of items on this page
    pub fn item_count(&self) -> usize {
        match self {
            ProviderResult::Amazon(res) => res
                .search_result
                .as_ref()
                .map(|r| r.items.len())
                .unwrap_or(0),
            ProviderResult::Rakuten(res) => res.items.len(),
        }
    }
}
