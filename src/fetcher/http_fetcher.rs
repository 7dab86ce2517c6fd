use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::app::{QuireError, Result};
use crate::config::SourceConfig;
use crate::fetcher::Fetcher;

/// reqwest-backed fetcher. One client, and so one connection pool, is shared
/// by every request made through it.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| QuireError::Http {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let http_error = |source| QuireError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuireError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(http_error)?;
        tracing::debug!(url, bytes = body.len(), "fetched");

        serde_json::from_slice(&body).map_err(|source| QuireError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
