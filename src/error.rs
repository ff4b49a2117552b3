//! Error types for the keyset reconciliation system.
//!
//! The reconciliation engine itself never fails: every uncertain branch
//! resolves to an unchanged output. Errors here cover the surrounding
//! layers: configuration loading, the JSON value boundary and file IO.

use std::path::PathBuf;
use thiserror::Error;

use crate::planner::Diagnostic;

/// The main error type for the keyset reconciliation system.
#[derive(Debug, Error)]
pub enum KeysetError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Structural value construction errors.
    #[error("Value error: {0}")]
    Value(#[from] ValueError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON syntax errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// The requested attribute profile does not exist.
    #[error("Unknown attribute profile: {name}")]
    UnknownProfile {
        /// The requested profile name.
        name: String,
    },
}

/// Errors raised while materializing typed values from untyped input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A number could not be represented as a 64-bit integer.
    #[error("Number {value} at {path} is not a 64-bit integer")]
    NonIntegralNumber {
        /// Attribute path of the number.
        path: String,
        /// The rendered number.
        value: String,
    },

    /// The document is neither null, unknown, nor an array.
    #[error("Expected a list at {path}, found {found}")]
    NotACollection {
        /// Attribute path of the value.
        path: String,
        /// Kind of value actually found.
        found: String,
    },

    /// A collection element is not an object.
    #[error("Element {index} is not an object (found {found})")]
    ElementNotObject {
        /// Position of the element.
        index: usize,
        /// Kind of value actually found.
        found: String,
    },

    /// A collection element does not match the list element type.
    #[error("Element {index} does not match the list element type: {detail}")]
    ShapeMismatch {
        /// Position of the element.
        index: usize,
        /// Which attributes are missing or unexpected.
        detail: String,
    },
}

/// Result type alias for keyset operations.
pub type Result<T> = std::result::Result<T, KeysetError>;

impl KeysetError {
    /// Returns true if the error came from user-supplied configuration.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a validation error without a specific field.
    #[must_use]
    pub fn validation_general(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: None,
        }
    }
}

impl ValueError {
    /// Converts this error into an error diagnostic for the host framework.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error("Value Construction Error", self.to_string())
    }
}

impl From<ValueError> for Diagnostic {
    fn from(err: ValueError) -> Self {
        err.to_diagnostic()
    }
}
