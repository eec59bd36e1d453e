//! In-memory transport for tests

use super::Transport;
use crate::error::DispatchError;
use crate::providers::{ProviderRequest, ProviderResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Transport that answers every request with the same outcome and
/// records what it was asked to send
#[derive(Debug)]
pub struct MockTransport {
    outcome: Result<ProviderResponse, DispatchError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockTransport {
    pub fn responding(status: u16, body: &str) -> Self {
        Self::with_outcome(Ok(ProviderResponse::new(status, body)))
    }

    pub fn failing(err: DispatchError) -> Self {
        Self::with_outcome(Err(err))
    }

    fn with_outcome(outcome: Result<ProviderResponse, DispatchError>) -> Self {
        Self {
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Wait before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ProviderRequest) -> Result<ProviderResponse, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}
