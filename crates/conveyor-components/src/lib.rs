//! Pluggable pipeline components and their resolution from configuration.

pub mod builtins;
pub mod component;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod resolver;

/// Built-in component registry and registration helper.
pub use builtins::{builtin_component_registry, register_builtin_components};
/// Component contract and capability traits.
pub use component::{Capability, Component, Input, Output, WriteMode};
/// Component, lookup and resolution errors.
pub use error::{ComponentError, LookupError, ResolutionError};
/// Pipeline preflight gate.
pub use pipeline::{Preflight, PreflightError, PreflightReport, ScopedReport, StepComponents, preflight};
/// Component registry types.
pub use registry::{ComponentRegistry, Constructor, RegisteredAlias, RegisteredComponent};
/// Resolver and the selector key it reads.
pub use resolver::{ComponentResolver, TYPE_CONFIG_NAME};
