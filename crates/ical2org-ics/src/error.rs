//! Error types for calendar parsing.

use thiserror::Error;

/// Result type for calendar parsing.
pub type IcsResult<T> = Result<T, IcsError>;

/// Errors that can occur while reading a calendar document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IcsError {
    /// The document is not valid iCalendar.
    #[error("invalid iCalendar document: {0}")]
    Invalid(String),
}

impl IcsError {
    /// Creates an invalid document error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}
