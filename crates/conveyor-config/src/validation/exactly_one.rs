//! Mutual-exclusion check across candidate paths.

use super::{IssueKind, Validation, ValidationResult, format_paths};
use crate::{ConfigTree, ValueType};
use std::collections::BTreeSet;

/// Exactly one of the candidate paths must be present.
///
/// When an expected type is supplied, the single present value must also
/// have that type. No type check happens without one.
#[derive(Debug, Clone)]
pub struct ExactlyOnePathExists {
    paths: Vec<String>,
    expected_type: Option<ValueType>,
}

impl ExactlyOnePathExists {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            expected_type: None,
        }
    }

    /// Require the present path to hold a value of this type.
    pub fn with_type(mut self, expected: ValueType) -> Self {
        self.expected_type = Some(expected);
        self
    }
}

impl Validation for ExactlyOnePathExists {
    fn name(&self) -> &'static str {
        "exactly-one-path-exists"
    }

    fn validate(&self, config: &ConfigTree) -> ValidationResult {
        let present: Vec<String> = self
            .paths
            .iter()
            .filter(|path| config.has_path(path))
            .cloned()
            .collect();

        match present.as_slice() {
            [] => ValidationResult::invalid(
                IssueKind::MutualExclusion,
                format!(
                    "None of the paths {} are set, exactly one is required",
                    format_paths(&self.paths)
                ),
            ),
            [single] => {
                if let (Some(expected), Some(actual)) =
                    (self.expected_type, config.value_type(single))
                {
                    if expected != actual {
                        return ValidationResult::invalid(
                            IssueKind::InvalidValue,
                            format!(
                                "Path '{single}' is set but has type {actual}, expected {expected}"
                            ),
                        );
                    }
                }
                ValidationResult::valid(format!(
                    "Exactly one of the paths {} is set: '{single}'",
                    format_paths(&self.paths)
                ))
            }
            _ => ValidationResult::invalid(
                IssueKind::MutualExclusion,
                format!(
                    "More than one of the paths {} are set ({}), exactly one is allowed",
                    format_paths(&self.paths),
                    present.join(", ")
                ),
            ),
        }
    }

    fn known_paths(&self) -> BTreeSet<String> {
        self.paths.iter().cloned().collect()
    }
}
