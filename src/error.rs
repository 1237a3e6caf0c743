//! Error types for the private trading API.

use thiserror::Error;

/// Top-level error returned by every trading operation.
#[derive(Error, Debug)]
pub enum TradeError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Network-level failures, passed through untouched by the signing pipeline.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TradeError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        TradeError::MalformedResponse(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        TradeError::Configuration(msg.into())
    }
}
