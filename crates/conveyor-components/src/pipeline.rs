//! Preflight gate run before a pipeline starts.
//!
//! A pipeline names its steps under `steps`; each step may carry an `input`
//! and an `output` component, each selected by its own `type` key:
//!
//! ```json5
//! {
//!   application: { name: "daily-load" },
//!   steps: {
//!     load: {
//!       input: { type: "filesystem", path: "/data/in", format: "json" },
//!       output: { type: "log" },
//!     },
//!     publish: {
//!       dependencies: ["load"],
//!       output: { type: "hbase", table: { name: "events" }, mapping: { ... } },
//!     },
//!   },
//! }
//! ```
//!
//! Every component is resolved first and validated over its own sub-tree
//! using the rule set of the unconfigured instance. It is configured only when
//! that pass is valid, so option problems land in the report instead of
//! stopping the run. Resolution failures, and configure failures on an
//! instance whose pass was valid, are fatal. One more pass runs per step over
//! the step-level keys, and one over the pipeline-level keys. Execution may
//! start only when every pass is valid.

use crate::component::{Capability, Input, Output};
use crate::error::ResolutionError;
use crate::resolver::{ComponentResolver, TYPE_CONFIG_NAME};
use conveyor_config::validation::{IssueKind, Validation, ValidationResult};
use conveyor_config::{
    ConfigTree, UnknownKeyPolicy, ValidationReport, Validations, Validator, ValueType, join_path,
};
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

pub const STEPS_CONFIG: &str = "steps";
pub const INPUT_CONFIG: &str = "input";
pub const OUTPUT_CONFIG: &str = "output";
pub const DEPENDENCIES_CONFIG: &str = "dependencies";
pub const APPLICATION_NAME_CONFIG: &str = "application.name";
pub const APPLICATION_EXECUTORS_CONFIG: &str = "application.executors";

/// Scope name of the pipeline-level pass.
pub const PIPELINE_SCOPE: &str = "pipeline";

/// Fatal preflight failures.
#[derive(Debug, Error)]
pub enum PreflightError {
    /// A component of a step could not be resolved, or rejected a configuration
    /// its rules accepted.
    #[error("step {step}: {source}")]
    Resolution {
        step: String,
        #[source]
        source: ResolutionError,
    },
    /// Validation passes reported failures or rejected unknown keys.
    #[error("configuration rejected: {failed} of {total} validation passes failed")]
    Rejected { failed: usize, total: usize },
}

/// One validation pass and the sub-tree it covered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopedReport {
    /// Dotted path of the sub-tree, or [`PIPELINE_SCOPE`].
    pub scope: String,
    pub report: ValidationReport,
}

/// Consolidated result of every validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreflightReport {
    scopes: Vec<ScopedReport>,
}

impl PreflightReport {
    pub fn scopes(&self) -> &[ScopedReport] {
        &self.scopes
    }

    /// Report of a single scope.
    pub fn scope(&self, scope: &str) -> Option<&ValidationReport> {
        self.scopes
            .iter()
            .find(|scoped| scoped.scope == scope)
            .map(|scoped| &scoped.report)
    }

    /// Whether execution may start.
    pub fn is_clean(&self) -> bool {
        self.scopes.iter().all(|scoped| scoped.report.is_valid())
    }

    /// Scopes whose pass is not valid.
    pub fn failed_scopes(&self) -> impl Iterator<Item = &ScopedReport> {
        self.scopes.iter().filter(|scoped| !scoped.report.is_valid())
    }

    fn push(&mut self, scope: impl Into<String>, report: ValidationReport) {
        self.scopes.push(ScopedReport {
            scope: scope.into(),
            report,
        });
    }
}

impl fmt::Display for PreflightReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scoped in &self.scopes {
            let verdict = if scoped.report.is_valid() { "ok" } else { "FAILED" };
            writeln!(f, "== {} ({verdict})", scoped.scope)?;
            write!(f, "{}", scoped.report)?;
        }
        Ok(())
    }
}

/// Configured components of one step.
///
/// A component whose validation pass failed is left out.
#[derive(Debug, Default)]
pub struct StepComponents {
    pub input: Option<Box<dyn Input>>,
    pub output: Option<Box<dyn Output>>,
}

/// Outcome of [`preflight`]: the report plus the components it configured.
#[derive(Debug)]
pub struct Preflight {
    pub report: PreflightReport,
    pub components: BTreeMap<String, StepComponents>,
}

impl Preflight {
    /// Hand out the components only when the gate is open.
    pub fn ensure_clean(self) -> Result<BTreeMap<String, StepComponents>, PreflightError> {
        if self.report.is_clean() {
            return Ok(self.components);
        }
        Err(PreflightError::Rejected {
            failed: self.report.failed_scopes().count(),
            total: self.report.scopes().len(),
        })
    }
}

/// Every `dependencies` entry must name another declared step.
#[derive(Debug, Clone)]
pub struct StepDependencies {
    step: String,
    steps: BTreeSet<String>,
}

impl StepDependencies {
    pub fn new(step: impl Into<String>, steps: BTreeSet<String>) -> Self {
        Self {
            step: step.into(),
            steps,
        }
    }
}

impl Validation for StepDependencies {
    fn name(&self) -> &'static str {
        "step-dependencies"
    }

    fn validate(&self, config: &ConfigTree) -> ValidationResult {
        let Some(Value::Array(dependencies)) = config.get(DEPENDENCIES_CONFIG) else {
            return ValidationResult::valid("No step dependencies declared");
        };
        let mut unknown = Vec::new();
        for dependency in dependencies {
            match dependency.as_str() {
                Some(name) if name == self.step => {
                    return ValidationResult::invalid(
                        IssueKind::InvalidValue,
                        format!("Step '{}' depends on itself", self.step),
                    );
                }
                Some(name) if self.steps.contains(name) => {}
                Some(name) => unknown.push(name.to_string()),
                None => unknown.push(dependency.to_string()),
            }
        }
        if unknown.is_empty() {
            ValidationResult::valid(format!("Dependencies of step '{}' are declared", self.step))
        } else {
            ValidationResult::invalid(
                IssueKind::InvalidValue,
                format!(
                    "Step '{}' depends on undeclared steps: {}",
                    self.step,
                    unknown.join(", ")
                ),
            )
        }
    }

    fn known_paths(&self) -> BTreeSet<String> {
        BTreeSet::from([DEPENDENCIES_CONFIG.to_string()])
    }
}

fn pipeline_validations() -> Validations {
    Validations::builder()
        .mandatory_path(STEPS_CONFIG, Some(ValueType::Object))
        .structural_map(STEPS_CONFIG, std::iter::empty::<String>())
        .optional_path(APPLICATION_NAME_CONFIG, ValueType::String)
        .optional_path(APPLICATION_EXECUTORS_CONFIG, ValueType::Number)
        .handles_path(STEPS_CONFIG)
        .build()
}

fn step_validations(step: &str, steps: &BTreeSet<String>) -> Validations {
    Validations::builder()
        .optional_path(DEPENDENCIES_CONFIG, ValueType::List)
        .add(StepDependencies::new(step, steps.clone()))
        .optional_path(INPUT_CONFIG, ValueType::Object)
        .optional_path(OUTPUT_CONFIG, ValueType::Object)
        .handles_path(INPUT_CONFIG)
        .handles_path(OUTPUT_CONFIG)
        .build()
}

/// Rule set of a configured component, with its `type` selector owned.
fn component_validations(mut validations: Validations) -> Validations {
    validations.handle_path(TYPE_CONFIG_NAME);
    validations
}

/// Resolve one component, validate its sub-tree with the rules of the
/// unconfigured instance, and configure it only when that pass is valid.
fn check_component<C>(
    resolver: &ComponentResolver,
    validator: &Validator,
    step: &str,
    config: &ConfigTree,
) -> Result<(ValidationReport, Option<Box<C>>), PreflightError>
where
    C: Capability + ?Sized,
{
    let fatal = |source: ResolutionError| PreflightError::Resolution {
        step: step.to_string(),
        source,
    };
    let mut component = resolver.create::<C>(config, false).map_err(fatal)?;
    let report = validator.validate(config, &component_validations(component.validations()));
    if !report.is_valid() {
        debug!("skipping configure of {} in step {step} after failed validation", C::NAME);
        return Ok((report, None));
    }
    resolver.configure(component.as_mut(), config).map_err(fatal)?;
    Ok((report, Some(component)))
}

/// Sub-tree at `path`, or `None` when it is absent or not an object.
///
/// Shape problems are left to the validation passes.
fn object_at(config: &ConfigTree, path: &str) -> Option<ConfigTree> {
    match config.value_type(path) {
        Some(ValueType::Object) => config.sub_tree(path).ok(),
        _ => None,
    }
}

/// Resolve, configure and validate every component of a pipeline configuration.
pub fn preflight(
    config: &ConfigTree,
    resolver: &ComponentResolver,
    policy: UnknownKeyPolicy,
) -> Result<Preflight, PreflightError> {
    let validator = Validator::new(policy);
    let mut report = PreflightReport::default();
    let mut components = BTreeMap::new();

    let steps = object_at(config, STEPS_CONFIG)
        .map(|tree| tree.root().clone())
        .unwrap_or_default();
    let step_names = steps.keys().cloned().collect::<BTreeSet<_>>();

    for (name, step) in &steps {
        let Value::Object(step) = step else {
            continue;
        };
        let step_tree = ConfigTree::from(step.clone());
        let step_scope = join_path(STEPS_CONFIG, name);
        let mut resolved = StepComponents::default();
        let mut passes = Vec::new();

        if let Some(sub_tree) = object_at(&step_tree, INPUT_CONFIG) {
            let (pass, input) =
                check_component::<dyn Input>(resolver, &validator, name, &sub_tree)?;
            passes.push((join_path(&step_scope, INPUT_CONFIG), pass));
            resolved.input = input;
        }

        if let Some(sub_tree) = object_at(&step_tree, OUTPUT_CONFIG) {
            let (pass, output) =
                check_component::<dyn Output>(resolver, &validator, name, &sub_tree)?;
            passes.push((join_path(&step_scope, OUTPUT_CONFIG), pass));
            resolved.output = output;
        }

        report.push(
            step_scope,
            validator.validate(&step_tree, &step_validations(name, &step_names)),
        );
        for (scope, pass) in passes {
            report.push(scope, pass);
        }
        components.insert(name.clone(), resolved);
    }

    report.push(
        PIPELINE_SCOPE,
        validator.validate(config, &pipeline_validations()),
    );
    debug!(
        "preflight finished (steps={}, passes={}, clean={})",
        components.len(),
        report.scopes().len(),
        report.is_clean()
    );

    Ok(Preflight { report, components })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComponentError;
    use crate::registry::ComponentRegistry;
    use crate::{Component, WriteMode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct PlainInput;

    impl Component for PlainInput {
        fn configure(&mut self, _config: &ConfigTree) -> Result<(), ComponentError> {
            Ok(())
        }

        fn validations(&self) -> Validations {
            Validations::builder()
                .mandatory_path("path", Some(ValueType::String))
                .build()
        }
    }

    impl Input for PlainInput {}

    #[derive(Debug, Default)]
    struct PlainOutput;

    impl Component for PlainOutput {
        fn configure(&mut self, _config: &ConfigTree) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    impl Output for PlainOutput {
        fn write_modes(&self) -> &'static [WriteMode] {
            &[WriteMode::Append]
        }
    }

    fn resolver() -> ComponentResolver {
        let registry = ComponentRegistry::new();
        registry.register::<dyn Input, _>("test.PlainInput", || Box::new(PlainInput));
        registry.register::<dyn Output, _>("test.PlainOutput", || Box::new(PlainOutput));
        registry.register_alias::<dyn Input>("plain", "test.PlainInput");
        registry.register_alias::<dyn Output>("plain", "test.PlainOutput");
        ComponentResolver::new(registry)
    }

    fn tree(value: Value) -> ConfigTree {
        ConfigTree::from_value(value).expect("tree")
    }

    #[test]
    fn clean_pipeline_opens_gate() {
        let config = tree(json!({
            "application": { "name": "test" },
            "steps": {
                "load": {
                    "input": { "type": "plain", "path": "/in" },
                    "output": { "type": "plain" }
                },
                "after": { "dependencies": ["load"], "output": { "type": "test.PlainOutput" } }
            }
        }));

        let preflight = preflight(&config, &resolver(), UnknownKeyPolicy::Reject).expect("preflight");
        assert!(preflight.report.is_clean(), "{}", preflight.report);
        let scopes = preflight
            .report
            .scopes()
            .iter()
            .map(|scoped| scoped.scope.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            scopes,
            vec![
                "steps.after",
                "steps.after.output",
                "steps.load",
                "steps.load.input",
                "steps.load.output",
                "pipeline",
            ]
        );

        let components = preflight.ensure_clean().expect("clean");
        assert!(components["load"].input.is_some());
        assert!(components["after"].input.is_none());
        assert!(components["after"].output.is_some());
    }

    #[test]
    fn unknown_component_key_is_scoped_to_component() {
        let config = tree(json!({
            "steps": {
                "load": { "input": { "type": "plain", "path": "/in", "pth": "/typo" } }
            }
        }));

        let preflight = preflight(&config, &resolver(), UnknownKeyPolicy::Reject).expect("preflight");
        assert!(!preflight.report.is_clean());
        let input = preflight.report.scope("steps.load.input").expect("input scope");
        assert_eq!(input.unknown_keys(), ["pth".to_string()]);
        assert!(preflight.report.scope(PIPELINE_SCOPE).expect("pipeline").is_valid());

        assert!(preflight.components["load"].input.is_none());

        let err = preflight.ensure_clean().expect_err("rejected");
        assert!(matches!(err, PreflightError::Rejected { failed: 1, .. }));
    }

    #[test]
    fn warn_policy_keeps_gate_open() {
        let config = tree(json!({
            "extra": 1,
            "steps": { "load": { "input": { "type": "plain", "path": "/in" } } }
        }));

        let preflight = preflight(&config, &resolver(), UnknownKeyPolicy::Warn).expect("preflight");
        assert!(preflight.report.is_clean());
        assert_eq!(
            preflight
                .report
                .scope(PIPELINE_SCOPE)
                .expect("pipeline")
                .unknown_keys(),
            ["extra".to_string()]
        );
    }

    #[test]
    fn resolution_failure_is_fatal() {
        let config = tree(json!({
            "steps": { "load": { "input": { "path": "/in" } } }
        }));

        let err = preflight(&config, &resolver(), UnknownKeyPolicy::Reject).expect_err("fatal");
        match err {
            PreflightError::Resolution { step, source } => {
                assert_eq!(step, "load");
                assert!(matches!(source, ResolutionError::MissingType { capability: "input" }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_steps_fails_pipeline_pass() {
        let config = tree(json!({ "application": { "name": "empty" } }));

        let preflight = preflight(&config, &resolver(), UnknownKeyPolicy::Reject).expect("preflight");
        assert!(!preflight.report.is_clean());
        assert!(preflight.components.is_empty());
        let pipeline = preflight.report.scope(PIPELINE_SCOPE).expect("pipeline");
        let failed = pipeline
            .failures()
            .map(|outcome| outcome.rule.as_str())
            .collect::<Vec<_>>();
        assert_eq!(failed, vec!["mandatory-path"]);
    }

    #[test]
    fn step_entries_must_be_objects() {
        let config = tree(json!({ "steps": { "load": "filesystem" } }));

        let preflight = preflight(&config, &resolver(), UnknownKeyPolicy::Reject).expect("preflight");
        let pipeline = preflight.report.scope(PIPELINE_SCOPE).expect("pipeline");
        let failure = pipeline.failures().next().expect("structural failure");
        assert_eq!(failure.rule, "structural-map");
        assert_eq!(failure.result.kind(), Some(IssueKind::Structural));
    }

    #[test]
    fn dependencies_must_name_declared_steps() {
        let steps = BTreeSet::from(["load".to_string(), "publish".to_string()]);
        let rule = StepDependencies::new("publish", steps);

        assert!(rule.validate(&tree(json!({ "dependencies": ["load"] }))).is_valid());
        assert!(rule.validate(&tree(json!({}))).is_valid());

        let unknown = rule.validate(&tree(json!({ "dependencies": ["load", "clean"] })));
        assert_eq!(unknown.kind(), Some(IssueKind::InvalidValue));
        assert_eq!(
            unknown.message(),
            "Step 'publish' depends on undeclared steps: clean"
        );

        let cyclic = rule.validate(&tree(json!({ "dependencies": ["publish"] })));
        assert_eq!(cyclic.message(), "Step 'publish' depends on itself");
    }
}
