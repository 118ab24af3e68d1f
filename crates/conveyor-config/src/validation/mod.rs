//! Composable validation rules over a config tree.
//!
//! Each rule answers one question about the tree and declares the paths it
//! owns. The [`Validator`] runs a rule set, and flags any leaf path that no
//! rule owns as an unknown configuration key.

mod allowed_values;
mod builder;
mod conditional;
mod exactly_one;
mod path;
mod result;
mod schema_literal;
mod structural;
mod validator;


use crate::ConfigTree;
use std::collections::BTreeSet;
use std::fmt::Debug;

pub use allowed_values::AllowedValues;
pub use builder::{Validations, ValidationsBuilder};
pub use conditional::IfPathHasValue;
pub use exactly_one::ExactlyOnePathExists;
pub use path::{MandatoryPath, OptionalPath};
pub use result::{Cause, IssueKind, ValidationResult, Validity};
pub use schema_literal::SchemaLiteral;
pub use structural::StructuralMap;
pub use validator::{RuleOutcome, UnknownKeyPolicy, ValidationReport, Validator};

/// A stateless predicate over a config tree.
///
/// Implementations must not panic for any input: failures are returned as
/// invalid results. `known_paths` depends only on construction parameters and
/// must cover every top-level path `validate` reads.
pub trait Validation: Send + Sync + Debug {
    /// Short identifier used in reports.
    fn name(&self) -> &'static str;

    /// Evaluate the rule against a tree.
    fn validate(&self, config: &ConfigTree) -> ValidationResult;

    /// Paths this rule inspects or owns.
    fn known_paths(&self) -> BTreeSet<String>;
}

/// Render a path list for messages.
fn format_paths(paths: &[String]) -> String {
    format!("[{}]", paths.join(", "))
}
