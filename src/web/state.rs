//! Application state shared across handlers

use crate::config::Settings;
use crate::network::HttpClient;
use crate::search::Dispatcher;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Settings loaded at startup, never mutated
    pub settings: Arc<Settings>,
    /// Provider dispatcher
    pub dispatcher: Arc<Dispatcher>,
    /// Cancelled when the server shuts down; each request derives a child
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create application state from settings, with a real HTTP client
    pub fn new(settings: Settings, client: HttpClient) -> anyhow::Result<Self> {
        let dispatcher = Dispatcher::from_settings(&settings, Arc::new(client))?;
        Ok(Self::with_dispatcher(settings, dispatcher))
    }

    pub fn with_dispatcher(settings: Settings, dispatcher: Dispatcher) -> Self {
        Self {
            settings: Arc::new(settings),
            dispatcher: Arc::new(dispatcher),
            shutdown: CancellationToken::new(),
        }
    }
}
