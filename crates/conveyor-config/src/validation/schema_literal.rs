//! Two-stage check of an embedded schema literal.

use super::{IssueKind, Validation, ValidationResult};
use crate::ConfigTree;
use crate::schema::{parse_schema, struct_type_for};
use std::collections::BTreeSet;

/// The string at `path` must parse as a schema literal and convert to a typed record.
///
/// Absence is valid. A non-string value fails at the parse stage.
#[derive(Debug, Clone)]
pub struct SchemaLiteral {
    path: String,
}

impl SchemaLiteral {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Validation for SchemaLiteral {
    fn name(&self) -> &'static str {
        "schema-literal"
    }

    fn validate(&self, config: &ConfigTree) -> ValidationResult {
        if !config.has_path(&self.path) {
            return ValidationResult::valid(format!(
                "Path '{}' is not set, schema literal not checked",
                self.path
            ));
        }
        let text = match config.get_str(&self.path) {
            Ok(text) => text,
            Err(err) => {
                return ValidationResult::invalid(
                    IssueKind::LiteralParse,
                    format!("Schema literal at '{}' could not be read", self.path),
                )
                .with_cause(err);
            }
        };

        let literal = match parse_schema(text) {
            Ok(literal) => literal,
            Err(err) => {
                return ValidationResult::invalid(
                    IssueKind::LiteralParse,
                    format!("Schema literal at '{}' could not be parsed", self.path),
                )
                .with_cause(err);
            }
        };

        if let Err(err) = struct_type_for(&literal) {
            return ValidationResult::invalid(
                IssueKind::LiteralConversion,
                format!(
                    "Schema literal at '{}' could be parsed, but could not be converted to a typed record",
                    self.path
                ),
            )
            .with_cause(err);
        }

        ValidationResult::valid(format!(
            "Schema literal at '{}' could be parsed and converted to a typed record",
            self.path
        ))
    }

    fn known_paths(&self) -> BTreeSet<String> {
        BTreeSet::from([self.path.clone()])
    }
}
