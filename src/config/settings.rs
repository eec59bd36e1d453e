//! Settings structures for affiliate-search configuration

use crate::providers::ProviderKind;
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Main settings structure matching config.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    #[serde(rename = "Amazon")]
    pub amazon: AmazonConfig,
    #[serde(rename = "Rakuten")]
    pub rakuten: RakutenConfig,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        self.merge_from(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary key lookup
    pub fn merge_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("AFFILIATE_SEARCH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("AFFILIATE_SEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = lookup("AFFILIATE_SEARCH_DEFAULT_PROVIDER") {
            if let Ok(kind) = val.parse() {
                self.server.default_provider = kind;
            }
        }
        if let Some(val) = lookup("AFFILIATE_SEARCH_REQUEST_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                self.outgoing.request_timeout = timeout;
            }
        }

        if let Some(val) = lookup("AMAZON_ASSOCIATE_TAG") {
            self.amazon.associate_tag = val;
        }
        if let Some(val) = lookup("AMAZON_ACCESS_KEY") {
            self.amazon.access_key = val;
        }
        if let Some(val) = lookup("AMAZON_SECRET_KEY") {
            self.amazon.secret_key = val;
        }

        if let Some(val) = lookup("RAKUTEN_APPLICATION_ID") {
            self.rakuten.application_id = val;
        }
        if let Some(val) = lookup("RAKUTEN_APPLICATION_SECRET") {
            self.rakuten.application_secret = val;
        }
        if let Some(val) = lookup("RAKUTEN_AFFILIATE_ID") {
            self.rakuten.affiliate_id = val;
        }
    }

    /// Check that the settings can serve requests
    pub fn validate(&self) -> Result<()> {
        self.outgoing.timeout()?;

        if self.amazon.enabled {
            let missing = self.amazon.missing_fields();
            if !missing.is_empty() {
                bail!("Amazon is enabled but missing {}", missing.join(", "));
            }
        }

        if self.rakuten.enabled {
            let missing = self.rakuten.missing_fields();
            if !missing.is_empty() {
                bail!("Rakuten is enabled but missing {}", missing.join(", "));
            }
        }

        if !self.is_enabled(self.server.default_provider) {
            bail!(
                "server.default_provider is {} but that provider is disabled",
                self.server.default_provider
            );
        }

        Ok(())
    }

    /// Whether a provider is switched on
    pub fn is_enabled(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::Amazon => self.amazon.enabled,
            ProviderKind::Rakuten => self.rakuten.enabled,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
    /// Provider answering the single-provider `/search` route
    pub default_provider: ProviderKind,
    pub cors: CorsSettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "0.0.0.0".to_string(),
            default_provider: ProviderKind::Rakuten,
            cors: CorsSettings::default(),
        }
    }
}

/// Cross-origin policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    /// Allowed origins, `*` allows any
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allow_origins: vec!["*".to_string()],
            allow_methods: ["GET", "PUT", "POST", "DELETE"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Deadline for a single provider call, in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Proxy for all outgoing requests
    pub proxy: Option<String>,
}

impl OutgoingSettings {
    /// Deadline for a single provider call
    pub fn timeout(&self) -> Result<Duration> {
        let secs = self.request_timeout;
        if secs.is_nan() || secs <= 0.0 {
            bail!("outgoing.request_timeout must be a positive number of seconds, got {}", secs);
        }
        Duration::try_from_secs_f64(secs)
            .map_err(|e| anyhow!("outgoing.request_timeout {} is out of range: {}", secs, e))
    }
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            pool_maxsize: 20,
            proxy: None,
        }
    }
}

/// Amazon Product Advertising API credentials
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AmazonConfig {
    pub associate_tag: String,
    pub access_key: String,
    pub secret_key: String,
    /// Marketplace domain, e.g. `www.amazon.co.jp`
    pub marketplace: String,
    /// Override for the API host; derived from the marketplace when unset
    pub host: Option<String>,
    /// Override for the signing region; derived from the marketplace when unset
    pub region: Option<String>,
    /// Full base URL override (scheme and host), for sandboxes and tests
    pub endpoint: Option<String>,
    pub enabled: bool,
}

impl Default for AmazonConfig {
    fn default() -> Self {
        Self {
            associate_tag: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            marketplace: "www.amazon.co.jp".to_string(),
            host: None,
            region: None,
            endpoint: None,
            enabled: true,
        }
    }
}

impl AmazonConfig {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.associate_tag.is_empty() {
            missing.push("AssociateTag");
        }
        if self.access_key.is_empty() {
            missing.push("AccessKey");
        }
        if self.secret_key.is_empty() {
            missing.push("SecretKey");
        }
        missing
    }
}

impl fmt::Debug for AmazonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmazonConfig")
            .field("associate_tag", &self.associate_tag)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("marketplace", &self.marketplace)
            .field("host", &self.host)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Rakuten Web Service credentials
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RakutenConfig {
    #[serde(rename = "ApplicationID")]
    pub application_id: String,
    #[serde(rename = "ApplicationSecret")]
    pub application_secret: String,
    /// Optional; when set, item URLs come back as affiliate links
    #[serde(rename = "AffiliateID")]
    pub affiliate_id: String,
    /// Base URL override, for sandboxes and tests
    #[serde(rename = "Endpoint")]
    pub endpoint: Option<String>,
    #[serde(rename = "Enabled")]
    pub enabled: bool,
}

impl Default for RakutenConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            application_secret: String::new(),
            affiliate_id: String::new(),
            endpoint: None,
            enabled: true,
        }
    }
}

impl RakutenConfig {
    fn missing_fields(&self) -> Vec<&'static str> {
        if self.application_id.is_empty() {
            vec!["ApplicationID"]
        } else {
            vec![]
        }
    }
}

impl fmt::Debug for RakutenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RakutenConfig")
            .field("application_id", &self.application_id)
            .field("application_secret", &"***")
            .field("affiliate_id", &self.affiliate_id)
            .field("endpoint", &self.endpoint)
            .field("enabled", &self.enabled)
            .finish()
    }
}
