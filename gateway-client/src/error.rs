//! Error types for the gateway client

use review::FetchError;
use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service does not know the handle (HTTP 404).
    #[error("Handle not found: {handle}")]
    NotFound { handle: String },

    #[error("Gateway returned HTTP {0}")]
    Status(u16),

    #[error("Gateway returned invalid data: {0}")]
    InvalidData(String),

    #[error("Mock response not configured for: {0}")]
    NotConfigured(String),
}

impl From<GatewayError> for FetchError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound { handle } => FetchError::HandleNotFound { handle },
            GatewayError::InvalidData(reason) => FetchError::InvalidResponse(reason),
            other => FetchError::Network(other.to_string()),
        }
    }
}
