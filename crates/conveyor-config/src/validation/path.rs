//! Presence and type checks for a single path.

use super::{IssueKind, Validation, ValidationResult};
use crate::{ConfigTree, ValueType};
use std::collections::BTreeSet;

/// The path must be set, and match the expected type when one is given.
#[derive(Debug, Clone)]
pub struct MandatoryPath {
    path: String,
    expected_type: Option<ValueType>,
}

impl MandatoryPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected_type: None,
        }
    }

    pub fn with_type(mut self, expected: ValueType) -> Self {
        self.expected_type = Some(expected);
        self
    }
}

impl Validation for MandatoryPath {
    fn name(&self) -> &'static str {
        "mandatory-path"
    }

    fn validate(&self, config: &ConfigTree) -> ValidationResult {
        let Some(actual) = config.value_type(&self.path) else {
            return ValidationResult::invalid(
                IssueKind::Missing,
                format!("Mandatory path '{}' is not set", self.path),
            );
        };
        check_type(&self.path, self.expected_type, actual)
    }

    fn known_paths(&self) -> BTreeSet<String> {
        BTreeSet::from([self.path.clone()])
    }
}

/// If the path is set, its value must have the expected type.
#[derive(Debug, Clone)]
pub struct OptionalPath {
    path: String,
    expected_type: ValueType,
}

impl OptionalPath {
    pub fn new(path: impl Into<String>, expected_type: ValueType) -> Self {
        Self {
            path: path.into(),
            expected_type,
        }
    }
}

impl Validation for OptionalPath {
    fn name(&self) -> &'static str {
        "optional-path"
    }

    fn validate(&self, config: &ConfigTree) -> ValidationResult {
        match config.value_type(&self.path) {
            None => ValidationResult::valid(format!("Optional path '{}' is not set", self.path)),
            Some(actual) => check_type(&self.path, Some(self.expected_type), actual),
        }
    }

    fn known_paths(&self) -> BTreeSet<String> {
        BTreeSet::from([self.path.clone()])
    }
}

fn check_type(path: &str, expected: Option<ValueType>, actual: ValueType) -> ValidationResult {
    match expected {
        Some(expected) if expected != actual => ValidationResult::invalid(
            IssueKind::InvalidValue,
            format!("Path '{path}' has type {actual}, expected {expected}"),
        ),
        _ => ValidationResult::valid(format!("Path '{path}' is set with type {actual}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> ConfigTree {
        ConfigTree::from_value(value).expect("tree")
    }

    #[test]
    fn mandatory_path_reports_missing_and_wrong_type() {
        let rule = MandatoryPath::new("table.name").with_type(ValueType::String);

        let missing = rule.validate(&tree(json!({ "table": {} })));
        assert_eq!(missing.kind(), Some(IssueKind::Missing));

        let wrong = rule.validate(&tree(json!({ "table": { "name": 7 } })));
        assert_eq!(wrong.kind(), Some(IssueKind::InvalidValue));

        assert!(rule.validate(&tree(json!({ "table": { "name": "events" } }))).is_valid());
    }

    #[test]
    fn mandatory_path_treats_null_as_missing() {
        let rule = MandatoryPath::new("path");
        let result = rule.validate(&tree(json!({ "path": null })));
        assert_eq!(result.kind(), Some(IssueKind::Missing));
    }

    #[test]
    fn optional_path_only_checks_type_when_set() {
        let rule = OptionalPath::new("header", ValueType::Boolean);
        assert!(rule.validate(&tree(json!({}))).is_valid());
        assert!(rule.validate(&tree(json!({ "header": true }))).is_valid());
        assert!(!rule.validate(&tree(json!({ "header": "yes" }))).is_valid());
    }
}
