//! Outcome to status/body mapping

use super::models::ProviderResult;
use crate::error::SearchError;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

/// Transport-agnostic response: an HTTP status code and a JSON body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relayed {
    pub status: u16,
    pub body: Value,
}

impl Relayed {
    fn message(status: u16, message: String) -> Self {
        Self {
            status,
            body: Value::String(message),
        }
    }
}

/// Map the outcome of a search to exactly one response.
///
/// Validation failures are 400 and dispatch failures 500, both with the
/// error message as a JSON string. A result is passed through unchanged.
pub fn relay(outcome: Result<ProviderResult, SearchError>) -> Relayed {
    match outcome {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(body) => Relayed { status: 200, body },
            Err(e) => {
                error!("Failed to encode {} result: {}", result.kind(), e);
                Relayed::message(500, e.to_string())
            }
        },
        Err(err @ SearchError::Validation(_)) => Relayed::message(400, err.to_string()),
        Err(err @ SearchError::Dispatch(_)) => Relayed::message(500, err.to_string()),
        Err(err @ SearchError::ProviderUnavailable(_)) => Relayed::message(404, err.to_string()),
    }
}
