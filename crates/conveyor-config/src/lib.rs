//! Configuration tree, validation rules and schema literals.
//!
//! This crate owns the read-only config tree handed to every pipeline
//! component, the reusable validation rules components compose, and the
//! aggregator that turns a rule set into one consolidated report.

mod error;
pub mod schema;
mod tree;
pub mod validation;

/// Public error type returned by config loading and typed reads.
pub use error::ConfigError;
/// Config tree and value discriminants.
pub use tree::{ConfigTree, ValueType, join_path};
/// Validation contract, rules and aggregator.
pub use validation::{
    UnknownKeyPolicy, Validation, ValidationReport, ValidationResult, Validations, Validator,
    Validity,
};
