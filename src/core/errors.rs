//! Error types for the Lockbox UI core
//!
//! This module defines the error taxonomy shared by the credential store
//! and the controllers. The variants map directly onto how each failure
//! is surfaced: validation errors become field-level messages, not-found
//! errors abort the operation and return the controller to its previous
//! stable state, and precondition errors indicate a sequencing fault in
//! the caller.

use thiserror::Error;

/// Errors produced by the store and the controllers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Bad user input, surfaced as a field-level message
    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    /// The referenced record no longer exists (concurrent external mutation)
    #[error("Credential not found: {guid}")]
    NotFound { guid: String },

    /// The operation was attempted in a state that forbids it
    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    /// The underlying backend is unreachable; retry is user-initiated
    #[error("Credential store unavailable: {message}")]
    Unavailable { message: String },

    /// Serialization or deserialization of persisted state failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// I/O failure while reading or writing persisted state
    #[error("I/O error: {message}")]
    Io { message: String },
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Build a validation error for a named form field
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a not-found error for a guid
    pub fn not_found<S: Into<String>>(guid: S) -> Self {
        CoreError::NotFound { guid: guid.into() }
    }

    /// Build a precondition error
    pub fn precondition<S: Into<String>>(message: S) -> Self {
        CoreError::Precondition {
            message: message.into(),
        }
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io {
            message: err.to_string(),
        }
    }
}
