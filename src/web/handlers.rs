//! HTTP request handlers

use super::extract::SearchPayload;
use super::state::AppState;
use crate::error::{SearchError, ValidationError};
use crate::providers::ProviderKind;
use crate::search::{relay, ProviderResult, Relayed};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        relay(Err(self.into())).into_response()
    }
}

/// Single-provider search, answered by the configured default provider
pub async fn search(
    State(state): State<AppState>,
    payload: Result<SearchPayload, ValidationError>,
) -> Relayed {
    let kind = state.settings.server.default_provider;
    run_search(&state, kind, payload, state.shutdown.child_token()).await
}

/// Search on the provider named in the path
pub async fn provider_search(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    payload: Result<SearchPayload, ValidationError>,
) -> Response {
    match provider.parse::<ProviderKind>() {
        Ok(kind) => run_search(&state, kind, payload, state.shutdown.child_token())
            .await
            .into_response(),
        Err(e) => (StatusCode::NOT_FOUND, Json(e.to_string())).into_response(),
    }
}

/// `cancel` is cancelled when this future is dropped (client gone) and
/// when its parent, the shutdown token, fires
async fn run_search(
    state: &AppState,
    kind: ProviderKind,
    payload: Result<SearchPayload, ValidationError>,
    cancel: CancellationToken,
) -> Relayed {
    let _guard = cancel.clone().drop_guard();

    let outcome: Result<ProviderResult, SearchError> = async {
        let SearchPayload(raw) = payload?;
        let request = raw.validate()?;
        debug!(
            "Searching {} for {:?} (price {}..{}, sort {})",
            kind,
            request.keyword(),
            request.min_price(),
            request.max_price(),
            request.sort()
        );
        state.dispatcher.dispatch(kind, &request, &cancel).await
    }
    .await;

    match &outcome {
        Ok(result) => info!("{} returned {} items", kind, result.item_count()),
        Err(SearchError::Validation(e)) => info!("Rejected {} search: {}", kind, e),
        Err(e) => info!("{} search failed: {}", kind, e),
    }

    relay(outcome)
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let providers: Vec<&str> = state
        .dispatcher
        .enabled()
        .into_iter()
        .map(|kind| kind.as_str())
        .collect();

    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "providers": providers,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RakutenConfig, Settings};
    use crate::network::MockTransport;
    use crate::providers::Rakuten;
    use crate::query::RawSearchRequest;
    use crate::search::Dispatcher;
    use std::sync::Arc;
    use std::time::Duration;

    fn state(transport: Arc<MockTransport>) -> AppState {
        let dispatcher = Dispatcher::new(transport).with_rakuten(Rakuten::new(RakutenConfig {
            application_id: "app".to_string(),
            ..Default::default()
        }));
        AppState::with_dispatcher(Settings::default(), dispatcher)
    }

    fn shoes() -> Result<SearchPayload, ValidationError> {
        Ok(SearchPayload(RawSearchRequest::keyword("shoes")))
    }

    #[tokio::test]
    async fn test_client_disconnect_cancels_provider_call() {
        let transport = Arc::new(
            MockTransport::responding(200, "{}").with_delay(Duration::from_secs(5)),
        );
        let state = state(transport.clone());
        let cancel = state.shutdown.child_token();

        // the handler future is dropped mid-call, as when the client hangs up
        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            run_search(&state, ProviderKind::Rakuten, shoes(), cancel.clone()),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(transport.calls(), 1);
        assert!(cancel.is_cancelled());
        assert!(!state.shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_search() {
        let transport = Arc::new(
            MockTransport::responding(200, "{}").with_delay(Duration::from_secs(5)),
        );
        let state = state(transport);
        let shutdown = state.shutdown.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            shutdown.cancel();
        });

        let relayed = run_search(
            &state,
            ProviderKind::Rakuten,
            shoes(),
            state.shutdown.child_token(),
        )
        .await;

        assert_eq!(relayed.status, 500);
        assert_eq!(relayed.body, serde_json::json!("request cancelled"));
    }
}
