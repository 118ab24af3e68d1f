//! Rules that only apply when a selector path holds a given value.

use super::{Validation, ValidationResult};
use crate::ConfigTree;
use serde_json::Value;
use std::collections::BTreeSet;

/// Runs the nested rule only when `path` equals `value`.
#[derive(Debug)]
pub struct IfPathHasValue {
    path: String,
    value: Value,
    rule: Box<dyn Validation>,
}

impl IfPathHasValue {
    pub fn new(path: impl Into<String>, value: impl Into<Value>, rule: Box<dyn Validation>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            rule,
        }
    }
}

impl Validation for IfPathHasValue {
    fn name(&self) -> &'static str {
        self.rule.name()
    }

    fn validate(&self, config: &ConfigTree) -> ValidationResult {
        match config.get(&self.path) {
            Some(value) if *value == self.value => self.rule.validate(config),
            _ => ValidationResult::valid(format!(
                "Path '{}' is not {}, conditional rule not applicable",
                self.path, self.value
            )),
        }
    }

    fn known_paths(&self) -> BTreeSet<String> {
        let mut paths = self.rule.known_paths();
        paths.insert(self.path.clone());
        paths
    }
}
