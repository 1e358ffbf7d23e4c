//! Shared error types for the FPL optimizer client

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SharedError {
    #[error("Invalid position: {input}")]
    InvalidPosition { input: String },

    #[error("Invalid player id token: {token}")]
    InvalidPlayerId { token: String },

    #[error("Invalid budget: {value}")]
    InvalidBudget { value: f64 },

    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },
}

impl SharedError {
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
