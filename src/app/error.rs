use thiserror::Error;

use crate::domain::ValidationError;
use crate::resolver::SectionError;

#[derive(Error, Debug)]
pub enum QuireError {
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} fetching {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected payload from {url}: expected {expected}")]
    Payload { url: String, expected: &'static str },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid item {item_id}: {source}")]
    Validation {
        item_id: String,
        #[source]
        source: ValidationError,
    },

    #[error("Item {item_id} rejected at section {index}: {source}")]
    Section {
        item_id: String,
        index: usize,
        #[source]
        source: SectionError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl QuireError {
    /// Whether the failure happened while talking to the provider.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            QuireError::Http { .. }
                | QuireError::Status { .. }
                | QuireError::Decode { .. }
                | QuireError::Payload { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, QuireError>;
