//! Membership check for a single path.

use super::{IssueKind, Validation, ValidationResult};
use crate::ConfigTree;
use serde_json::Value;
use std::collections::BTreeSet;

/// If `path` is present, its value must equal one of the allowed values.
///
/// Comparison is exact JSON equality. Absence is valid; requiredness belongs
/// to [`MandatoryPath`](super::MandatoryPath) or
/// [`ExactlyOnePathExists`](super::ExactlyOnePathExists).
#[derive(Debug, Clone)]
pub struct AllowedValues {
    path: String,
    allowed: Vec<Value>,
}

impl AllowedValues {
    pub fn new<I, V>(path: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            path: path.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    fn allowed_display(&self) -> String {
        let values: Vec<String> = self.allowed.iter().map(Value::to_string).collect();
        format!("[{}]", values.join(", "))
    }
}

impl Validation for AllowedValues {
    fn name(&self) -> &'static str {
        "allowed-values"
    }

    fn validate(&self, config: &ConfigTree) -> ValidationResult {
        let Some(value) = config.get(&self.path) else {
            return ValidationResult::valid(format!(
                "Path '{}' is not set, allowed values not checked",
                self.path
            ));
        };
        if self.allowed.iter().any(|allowed| allowed == value) {
            ValidationResult::valid(format!(
                "Value {} for path '{}' is allowed",
                value, self.path
            ))
        } else {
            ValidationResult::invalid(
                IssueKind::InvalidValue,
                format!(
                    "Value {} for path '{}' is not one of the allowed values {}",
                    value,
                    self.path,
                    self.allowed_display()
                ),
            )
        }
    }

    fn known_paths(&self) -> BTreeSet<String> {
        BTreeSet::from([self.path.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validity;
    use pretty_assertions::assert_eq;

    fn rule() -> AllowedValues {
        AllowedValues::new("hello", [1, 2, 3])
    }

    fn tree(text: &str) -> ConfigTree {
        ConfigTree::load_from_str(text).expect("tree")
    }

    #[test]
    fn accepts_member_value() {
        let result = rule().validate(&tree("{ hello: 2 }"));
        assert_eq!(result.validity(), Validity::Valid);
    }

    #[test]
    fn absent_path_is_valid() {
        let result = rule().validate(&tree("{ world: 2 }"));
        assert_eq!(result.validity(), Validity::Valid);
    }

    #[test]
    fn rejects_non_member_value() {
        let result = rule().validate(&tree("{ hello: 4 }"));
        assert_eq!(result.validity(), Validity::Invalid);
        assert_eq!(result.kind(), Some(IssueKind::InvalidValue));
        assert!(result.message().contains("[1, 2, 3]"));
    }

    #[test]
    fn string_members_do_not_match_numbers() {
        let rule = AllowedValues::new("mode", ["1", "2"]);
        assert!(!rule.validate(&tree("{ mode: 1 }")).is_valid());
        assert!(rule.validate(&tree("{ mode: '1' }")).is_valid());
    }

    #[test]
    fn known_paths_is_the_checked_path() {
        assert_eq!(rule().known_paths(), BTreeSet::from(["hello".to_string()]));
    }
}
