//! Provider dispatch

use super::models::ProviderResult;
use crate::config::Settings;
use crate::error::{DispatchError, SearchError};
use crate::network::Transport;
use crate::providers::{Amazon, Provider, ProviderKind, Rakuten};
use crate::query::ValidatedSearchRequest;
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Routes a validated request to one provider and awaits its answer.
///
/// Holds the configured providers, which own their credentials, and the
/// transport. Every call runs under a deadline and a cancellation token.
/// Nothing is cached or retried.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    amazon: Option<Amazon>,
    rakuten: Option<Rakuten>,
    timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher with no providers
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            amazon: None,
            rakuten: None,
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT),
        }
    }

    /// Create a dispatcher for every provider enabled in the settings
    pub fn from_settings(settings: &Settings, transport: Arc<dyn Transport>) -> Result<Self> {
        let mut dispatcher = Self::new(transport)
            .with_timeout(settings.outgoing.timeout()?);

        if settings.amazon.enabled {
            dispatcher = dispatcher.with_amazon(Amazon::new(settings.amazon.clone())?);
            info!("Loaded provider: amazon ({})", settings.amazon.marketplace);
        } else {
            info!("Skipping disabled provider: amazon");
        }

        if settings.rakuten.enabled {
            dispatcher = dispatcher.with_rakuten(Rakuten::new(settings.rakuten.clone()));
            info!("Loaded provider: rakuten");
        } else {
            info!("Skipping disabled provider: rakuten");
        }

        Ok(dispatcher)
    }

    pub fn with_amazon(mut self, provider: Amazon) -> Self {
        self.amazon = Some(provider);
        self
    }

    pub fn with_rakuten(mut self, provider: Rakuten) -> Self {
        self.rakuten = Some(provider);
        self
    }

    /// Set the per-call deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Providers that can be dispatched to
    pub fn enabled(&self) -> Vec<ProviderKind> {
        let mut kinds = Vec::new();
        if self.amazon.is_some() {
            kinds.push(ProviderKind::Amazon);
        }
        if self.rakuten.is_some() {
            kinds.push(ProviderKind::Rakuten);
        }
        kinds
    }

    /// Build the query for `kind` and run it
    pub async fn dispatch(
        &self,
        kind: ProviderKind,
        request: &ValidatedSearchRequest,
        cancel: &CancellationToken,
    ) -> Result<ProviderResult, SearchError> {
        match kind {
            ProviderKind::Amazon => {
                let provider = self
                    .amazon
                    .as_ref()
                    .ok_or(SearchError::ProviderUnavailable(kind))?;
                let query = provider.build(request);
                Ok(ProviderResult::Amazon(
                    self.execute(provider, &query, cancel).await?,
                ))
            }
            ProviderKind::Rakuten => {
                let provider = self
                    .rakuten
                    .as_ref()
                    .ok_or(SearchError::ProviderUnavailable(kind))?;
                let query = provider.build(request);
                Ok(ProviderResult::Rakuten(
                    self.execute(provider, &query, cancel).await?,
                ))
            }
        }
    }

    /// Send an already built query to its provider.
    ///
    /// Exactly one request goes out. The call is abandoned when `cancel`
    /// fires or the deadline passes.
    pub async fn execute<P: Provider>(
        &self,
        provider: &P,
        query: &P::Query,
        cancel: &CancellationToken,
    ) -> Result<P::Response, DispatchError> {
        let kind = provider.kind();
        debug!("Built {} query: {:?}", kind, query);

        let request = provider.request(query)?;
        let start = Instant::now();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Search on {} cancelled after {:?}", kind, start.elapsed());
                return Err(DispatchError::Cancelled);
            }
            result = timeout(self.timeout, self.transport.execute(request)) => match result {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!("Request to {} failed: {}", kind, e);
                    return Err(e);
                }
                Err(_) => {
                    warn!("Timeout for provider {}", kind);
                    return Err(DispatchError::Transport(format!(
                        "{} did not answer within {:?}",
                        kind, self.timeout
                    )));
                }
            },
        };

        info!(
            "{} answered HTTP {} in {:?}",
            kind,
            response.status,
            start.elapsed()
        );

        provider.response(response)
    }
}
