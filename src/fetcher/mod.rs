pub mod http_fetcher;
#[cfg(test)]
pub mod scripted;

use async_trait::async_trait;
use serde_json::Value;

use crate::app::Result;

/// Single-request JSON retrieval.
///
/// Implementations perform exactly one request per call and never retry.
/// Any transport, status or decode problem comes back as an error carrying
/// the URL; callers decide whether the missing body is recoverable.
#[async_trait]
pub trait Fetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}
