//! Error types for the Opsmith core library
//!
//! This module defines the error handling system for Opsmith, using
//! thiserror for ergonomic error definitions and anyhow for flexible
//! error contexts.

use thiserror::Error;

/// Main error type for Opsmith operations
#[derive(Error, Debug)]
pub enum Error {
    /// Validation findings raised by the schema engine
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Templating errors from the templating collaborator
    #[error("template error: {message}")]
    Template { message: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Module descriptor errors
    #[error("module error: {message}")]
    Module {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Generic internal error with context
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a validation finding
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template<M: Into<String>>(message: M) -> Self {
        Error::Template {
            message: message.into(),
        }
    }

    /// The bare message carried by this error, without the kind prefix
    ///
    /// Used by the validation report when aggregating findings into a
    /// bulleted list.
    pub fn message(&self) -> &str {
        match self {
            Error::Validation { message }
            | Error::Template { message }
            | Error::Json { message, .. }
            | Error::Module { message, .. }
            | Error::Internal { message, .. } => message,
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
