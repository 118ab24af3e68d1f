//! Error types for config loading and path traversal.

use crate::ValueType;
use thiserror::Error;

/// Errors returned while loading a config tree or reading typed values from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing config text failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The root of a config tree must be an object.
    #[error("config root must be an object, found {0}")]
    NotAnObject(ValueType),
    /// A required path is absent.
    #[error("missing config path: {path}")]
    Missing { path: String },
    /// A path is present but holds a value of another type.
    #[error("config path {path} has type {actual}, expected {expected}")]
    WrongType {
        path: String,
        expected: ValueType,
        actual: ValueType,
    },
    /// A value has the right type but cannot be used.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
}

impl ConfigError {
    /// Build a structured invalid-field error.
    pub fn invalid_field(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            path: path.into(),
            message: message.into(),
        }
    }
}
