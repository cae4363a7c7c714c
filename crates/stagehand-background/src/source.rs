//! Remote configuration document source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use stagehand_protocols::Configuration;
use stagehand_protocols::defaults::DEFAULT_CONFIG_URL;

use crate::error::ConfigFetchError;

/// Where fresh configuration comes from.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch(&self) -> Result<Configuration, ConfigFetchError>;
}

/// Fetches the configuration JSON over HTTP(S).
pub struct HttpConfigSource {
    url: String,
    client: Client,
}

impl HttpConfigSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }

    /// Source with a per-request timeout.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, ConfigFetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("Stagehand/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigFetchError::Network(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpConfigSource {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_URL)
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch(&self) -> Result<Configuration, ConfigFetchError> {
        debug!(url = %self.url, "Fetching remote configuration");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ConfigFetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigFetchError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ConfigFetchError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ConfigFetchError::Parse(e.to_string()))
    }
}
