//! Error types for calseries.

use thiserror::Error;

use crate::event::EventId;

/// Errors that can occur in calseries operations.
#[derive(Error, Debug)]
pub enum CalSeriesError {
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Event not found: {0}")]
    NotFound(EventId),

    #[error("Series regeneration failed and was rolled back: {0}")]
    Inconsistency(String),

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalSeriesError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CalSeriesError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Result type alias for calseries operations.
pub type CalSeriesResult<T> = Result<T, CalSeriesError>;
