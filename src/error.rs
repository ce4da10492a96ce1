//! Error types for the chat connector

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error (connection, TLS, timeout at the transport level)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Malformed caller input (e.g., inconsistent function-call policy)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Response body missing required structure
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Non-success status from the API that the retry policy declined to retry
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Retry attempts exhausted on a retryable outcome
    #[error("retry attempts exhausted after {attempts} attempts: {last}")]
    RetryExhausted { attempts: u32, last: String },

    /// The call was cancelled through its interrupt handle
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a new malformed-response error
    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Error::MalformedResponse(msg.into())
    }

    /// Create a new API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            message: message.into(),
        }
    }
}
