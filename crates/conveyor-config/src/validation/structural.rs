//! Shape check for maps of user-named entries.

use super::{IssueKind, Validation, ValidationResult};
use crate::{ConfigTree, ValueType};
use serde_json::Value;
use std::collections::BTreeSet;

/// Treats `parent` as a map from entry names to objects that must each carry
/// every required sub-field.
///
/// Entry names are user-defined, so the per-entry sub-paths cannot be
/// declared as known paths. Only the parent and any fixed sibling paths are
/// known; unknown-key detection does not see inside entries.
#[derive(Debug, Clone)]
pub struct StructuralMap {
    parent: String,
    required_fields: Vec<String>,
    fixed_paths: Vec<String>,
}

impl StructuralMap {
    pub fn new<I, S>(parent: impl Into<String>, required_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parent: parent.into(),
            required_fields: required_fields.into_iter().map(Into::into).collect(),
            fixed_paths: Vec::new(),
        }
    }

    /// Other top-level paths tied to the same structure.
    pub fn with_fixed_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixed_paths.extend(paths.into_iter().map(Into::into));
        self
    }
}

impl Validation for StructuralMap {
    fn name(&self) -> &'static str {
        "structural-map"
    }

    fn validate(&self, config: &ConfigTree) -> ValidationResult {
        let entries = match config.get(&self.parent) {
            None => {
                return ValidationResult::valid(format!(
                    "Path '{}' is not set, entries not checked",
                    self.parent
                ));
            }
            Some(Value::Object(entries)) => entries,
            Some(other) => {
                return ValidationResult::invalid(
                    IssueKind::Structural,
                    format!(
                        "Path '{}' must be an object of entries, found {}",
                        self.parent,
                        ValueType::of(other)
                    ),
                );
            }
        };

        for (entry, value) in entries {
            let Value::Object(fields) = value else {
                return ValidationResult::invalid(
                    IssueKind::Structural,
                    format!(
                        "Entry '{entry}' in '{}' must be an object, found {}",
                        self.parent,
                        ValueType::of(value)
                    ),
                );
            };
            let missing = self
                .required_fields
                .iter()
                .find(|field| fields.get(field.as_str()).is_none_or(Value::is_null));
            if let Some(field) = missing {
                return ValidationResult::invalid(
                    IssueKind::Structural,
                    format!(
                        "'{field}' not specified in entry '{entry}' of '{}'",
                        self.parent
                    ),
                );
            }
        }

        ValidationResult::valid(format!("Entries of '{}' are all valid", self.parent))
    }

    fn known_paths(&self) -> BTreeSet<String> {
        let mut paths: BTreeSet<String> = self.fixed_paths.iter().cloned().collect();
        paths.insert(self.parent.clone());
        paths
    }
}
