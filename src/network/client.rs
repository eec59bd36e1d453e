//! HTTP client for making requests to providers

use crate::config::OutgoingSettings;
use crate::error::DispatchError;
use crate::providers::{HttpMethod, ProviderRequest, ProviderResponse};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

/// Executes provider requests
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ProviderRequest) -> Result<ProviderResponse, DispatchError>;
}

/// HTTP client wrapper with service-wide configuration.
///
/// The overall deadline of a call is enforced by the dispatcher, so only
/// connection setup is bounded here.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(settings.timeout()?)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .user_agent(format!("affiliate-search/{}", crate::VERSION))
            .gzip(true)
            .brotli(true);

        if let Some(ref proxy_url) = settings.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Parse response into ProviderResponse
    async fn parse_response(response: Response) -> Result<ProviderResponse, DispatchError> {
        let status = response.status().as_u16();
        let text = response.text().await?;

        Ok(ProviderResponse { status, text })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute(&self, request: ProviderRequest) -> Result<ProviderResponse, DispatchError> {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        debug!("{:?} {}", request.method, request.url);
        let response = req_builder.send().await?;

        Self::parse_response(response).await
    }
}
