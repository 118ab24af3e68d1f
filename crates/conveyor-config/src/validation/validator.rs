//! Runs a rule set against one tree and detects unknown configuration keys.

use super::{Validations, ValidationResult};
use crate::ConfigTree;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// How unknown configuration keys affect acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeyPolicy {
    /// Unknown keys fail the report.
    #[default]
    Reject,
    /// Unknown keys are reported but do not fail the report.
    Warn,
}

/// Result of one rule within a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutcome {
    /// Rule identifier.
    pub rule: String,
    /// Paths the rule owns.
    pub paths: Vec<String>,
    pub result: ValidationResult,
}

/// Consolidated verdict for one tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    outcomes: Vec<RuleOutcome>,
    unknown_keys: Vec<String>,
    policy: UnknownKeyPolicy,
}

impl ValidationReport {
    pub fn outcomes(&self) -> &[RuleOutcome] {
        &self.outcomes
    }

    /// Outcomes whose result is invalid.
    pub fn failures(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.result.is_valid())
    }

    /// Leaf paths that no rule owns, sorted.
    pub fn unknown_keys(&self) -> &[String] {
        &self.unknown_keys
    }

    pub fn policy(&self) -> UnknownKeyPolicy {
        self.policy
    }

    /// Every rule passed and, under [`UnknownKeyPolicy::Reject`], no unknown keys were found.
    pub fn is_valid(&self) -> bool {
        let rules_pass = self.outcomes.iter().all(|outcome| outcome.result.is_valid());
        let keys_pass = self.policy == UnknownKeyPolicy::Warn || self.unknown_keys.is_empty();
        rules_pass && keys_pass
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "[{}] {}", outcome.rule, outcome.result)?;
        }
        if !self.unknown_keys.is_empty() {
            let label = match self.policy {
                UnknownKeyPolicy::Reject => "ERROR",
                UnknownKeyPolicy::Warn => "WARNING",
            };
            writeln!(
                f,
                "{label}: unknown configuration keys: {}",
                self.unknown_keys.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Aggregates rule results for a tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    policy: UnknownKeyPolicy,
}

impl Validator {
    pub fn new(policy: UnknownKeyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnknownKeyPolicy {
        self.policy
    }

    /// Run every rule and compare the tree's leaf paths against the declared known paths.
    ///
    /// Rules are independent and see the same immutable tree, so the report
    /// is a pure function of the inputs.
    pub fn validate(&self, config: &ConfigTree, validations: &Validations) -> ValidationReport {
        let outcomes = validations
            .rules()
            .iter()
            .map(|rule| RuleOutcome {
                rule: rule.name().to_string(),
                paths: rule.known_paths().into_iter().collect(),
                result: rule.validate(config),
            })
            .collect::<Vec<_>>();

        let known = validations.known_paths();
        let unknown_keys = config
            .leaf_paths()
            .into_iter()
            .filter(|leaf| !is_known(leaf, &known))
            .collect::<Vec<_>>();

        debug!(
            "validated config (rules={}, failures={}, unknown_keys={})",
            outcomes.len(),
            outcomes.iter().filter(|o| !o.result.is_valid()).count(),
            unknown_keys.len()
        );
        if self.policy == UnknownKeyPolicy::Warn && !unknown_keys.is_empty() {
            warn!("unknown configuration keys: {}", unknown_keys.join(", "));
        }

        ValidationReport {
            outcomes,
            unknown_keys,
            policy: self.policy,
        }
    }
}

/// A leaf is known if it equals a known path or sits beneath one.
fn is_known(leaf: &str, known: &BTreeSet<String>) -> bool {
    if known.contains(leaf) {
        return true;
    }
    known.iter().any(|path| {
        leaf.len() > path.len()
            && leaf.starts_with(path.as_str())
            && leaf.as_bytes()[path.len()] == b'.'
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prefix_requires_segment_boundary() {
        let known = BTreeSet::from(["columns".to_string(), "a.b".to_string()]);
        assert!(is_known("columns", &known));
        assert!(is_known("columns.id.col", &known));
        assert!(is_known("a.b.c", &known));
        assert!(!is_known("columnsx", &known));
        assert!(!is_known("a", &known));
    }
}
