//! Error types for component lookup, configuration and resolution.

use conveyor_config::{ConfigError, ValueType};
use thiserror::Error;

/// Errors returned by a component's configuration step.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// Reading an option from the config tree failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An option was read but cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors returned when the registry has no usable implementation for a symbol.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Nothing is registered under the identifier.
    #[error("no implementation registered as {id}")]
    NotRegistered { id: String },
    /// An implementation exists but does not provide the requested capability.
    #[error("{id} does not implement {capability} (provides: {provides})")]
    WrongCapability {
        id: String,
        capability: &'static str,
        provides: String,
    },
}

/// Fatal failures while resolving a component from configuration.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The `type` key is absent.
    #[error("{capability} type not specified")]
    MissingType { capability: &'static str },
    /// The `type` key is not a string.
    #[error("{capability} type must be a string, found {found}")]
    InvalidType {
        capability: &'static str,
        found: ValueType,
    },
    /// Neither an alias nor a registered implementation matched.
    #[error("could not resolve {capability} type {symbol}: {source}")]
    Unresolved {
        capability: &'static str,
        symbol: String,
        #[source]
        source: LookupError,
    },
    /// The instance rejected its configuration.
    #[error("failed to configure {capability} {symbol}: {source}")]
    Configure {
        capability: &'static str,
        symbol: String,
        #[source]
        source: ComponentError,
    },
}
