//! Client error types

use thiserror::Error;
use shared::SharedError;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error types.
///
/// Errors are `Clone` because a single fetch failure is stored on its cache
/// entry and handed to every caller that was waiting on that fetch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Network failure: {message}")]
    Network { message: String },

    #[error("Remote error: HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Validation failure: {message}")]
    Validation { message: String },

    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("Cache entry {key} holds a different payload type")]
    TypeMismatch { key: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ClientError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify a transport error from reqwest.
    ///
    /// Timeouts get their own kind; decode failures mean the payload did not
    /// have the expected shape; everything else never produced a response.
    pub fn from_transport(err: reqwest::Error, endpoint: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if err.is_decode() {
            Self::validation(format!("{endpoint}: {err}"))
        } else {
            Self::network(format!("{endpoint}: {err}"))
        }
    }

    /// Whether this failure happened before any response was received
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }
}

impl From<SharedError> for ClientError {
    fn from(err: SharedError) -> Self {
        Self::validation(err.to_string())
    }
}
