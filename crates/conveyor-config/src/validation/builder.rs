//! Fluent assembly of a component's rule set.

use super::{
    AllowedValues, ExactlyOnePathExists, IfPathHasValue, MandatoryPath, OptionalPath,
    SchemaLiteral, StructuralMap, Validation,
};
use crate::ValueType;
use serde_json::Value;
use std::collections::BTreeSet;

/// Rules plus the paths handled outside of them.
///
/// A handled path is owned by the holder of this set even though no rule
/// reads it (for example a `type` selector, or a nested component validated
/// in its own pass). Everything beneath a handled path is known.
#[derive(Debug, Default)]
pub struct Validations {
    rules: Vec<Box<dyn Validation>>,
    handled_paths: BTreeSet<String>,
}

impl Validations {
    /// Start building a rule set.
    pub fn builder() -> ValidationsBuilder {
        ValidationsBuilder::default()
    }

    pub fn rules(&self) -> &[Box<dyn Validation>] {
        &self.rules
    }

    pub fn handled_paths(&self) -> &BTreeSet<String> {
        &self.handled_paths
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.handled_paths.is_empty()
    }

    /// Union of every rule's known paths and the handled paths.
    pub fn known_paths(&self) -> BTreeSet<String> {
        let mut known = self.handled_paths.clone();
        for rule in &self.rules {
            known.extend(rule.known_paths());
        }
        known
    }

    /// Append another set, for example one contributed by a configured component.
    pub fn extend(&mut self, other: Validations) {
        self.rules.extend(other.rules);
        self.handled_paths.extend(other.handled_paths);
    }

    /// Mark a path as handled after construction.
    pub fn handle_path(&mut self, path: impl Into<String>) {
        self.handled_paths.insert(path.into());
    }
}

/// Builder for [`Validations`].
#[derive(Debug, Default)]
pub struct ValidationsBuilder {
    validations: Validations,
}

impl ValidationsBuilder {
    /// Require a path, optionally of a given type.
    pub fn mandatory_path(self, path: &str, expected: Option<ValueType>) -> Self {
        let rule = match expected {
            Some(expected) => MandatoryPath::new(path).with_type(expected),
            None => MandatoryPath::new(path),
        };
        self.add(rule)
    }

    /// Declare a path that may be set, with the type it must have when set.
    pub fn optional_path(self, path: &str, expected: ValueType) -> Self {
        self.add(OptionalPath::new(path, expected))
    }

    pub fn allowed_values<I, V>(self, path: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add(AllowedValues::new(path, allowed))
    }

    pub fn exactly_one_path_exists<I, S>(self, expected: Option<ValueType>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rule = ExactlyOnePathExists::new(paths);
        match expected {
            Some(expected) => self.add(rule.with_type(expected)),
            None => self.add(rule),
        }
    }

    pub fn structural_map<I, S>(self, parent: &str, required_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(StructuralMap::new(parent, required_fields))
    }

    pub fn schema_literal(self, path: &str) -> Self {
        self.add(SchemaLiteral::new(path))
    }

    /// Apply `rule` only when `path` equals `value`.
    pub fn if_path_has_value<R>(self, path: &str, value: impl Into<Value>, rule: R) -> Self
    where
        R: Validation + 'static,
    {
        self.add(IfPathHasValue::new(path, value, Box::new(rule)))
    }

    /// Own a path whose contents are validated elsewhere.
    pub fn handles_path(mut self, path: &str) -> Self {
        self.validations.handled_paths.insert(path.to_string());
        self
    }

    pub fn add<R>(mut self, rule: R) -> Self
    where
        R: Validation + 'static,
    {
        self.validations.rules.push(Box::new(rule));
        self
    }

    pub fn build(self) -> Validations {
        self.validations
    }
}
