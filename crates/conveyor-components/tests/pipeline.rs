use conveyor_components::{ComponentResolver, PreflightError, preflight};
use conveyor_config::{ConfigTree, UnknownKeyPolicy};
use conveyor_test_utils::{ConfigureProbe, recording_registry};
use pretty_assertions::assert_eq;

const PIPELINE: &str = r#"
{
  // batch load followed by a publish step
  application: { name: "nightly", executors: 4 },
  steps: {
    load: {
      input: { type: "recording", path: "/data/in" },
      output: { type: "recording" },
    },
    publish: {
      dependencies: ["load"],
      output: { type: "test.RecordingOutput" },
    },
  },
}
"#;

#[test]
fn preflight_configures_every_component_once() {
    let probe = ConfigureProbe::new();
    let resolver = ComponentResolver::new(recording_registry(&probe));
    let config = ConfigTree::load_from_str(PIPELINE).expect("pipeline parses");

    let preflight = preflight(&config, &resolver, UnknownKeyPolicy::Reject).expect("preflight");

    assert!(preflight.report.is_clean(), "{}", preflight.report);
    assert_eq!(probe.count(), 3);
    assert_eq!(
        probe.calls()[0],
        config.sub_tree("steps.load.input").expect("input tree")
    );
    let components = preflight.ensure_clean().expect("gate open");
    assert_eq!(
        components.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["load", "publish"]
    );
}

#[test]
fn component_rule_failure_closes_gate() {
    let probe = ConfigureProbe::new();
    let resolver = ComponentResolver::new(recording_registry(&probe));
    let config = ConfigTree::load_from_str(
        r#"{ steps: { load: { input: { type: "recording" } } } }"#,
    )
    .expect("pipeline parses");

    let preflight = preflight(&config, &resolver, UnknownKeyPolicy::Reject).expect("preflight");

    let input = preflight
        .report
        .scope("steps.load.input")
        .expect("input scope");
    let failures = input
        .failures()
        .map(|outcome| outcome.result.message().to_string())
        .collect::<Vec<_>>();
    assert_eq!(failures, vec!["Mandatory path 'path' is not set".to_string()]);
    assert!(matches!(
        preflight.ensure_clean(),
        Err(PreflightError::Rejected { failed: 1, total: 3 })
    ));
}

#[test]
fn undeclared_dependency_is_reported_on_step() {
    let probe = ConfigureProbe::new();
    let resolver = ComponentResolver::new(recording_registry(&probe));
    let config = ConfigTree::load_from_str(
        r#"{ steps: { publish: { dependencies: ["load"], output: { type: "recording" } } } }"#,
    )
    .expect("pipeline parses");

    let preflight = preflight(&config, &resolver, UnknownKeyPolicy::Reject).expect("preflight");

    let step = preflight.report.scope("steps.publish").expect("step scope");
    assert!(!step.is_valid());
    assert!(preflight.report.scope("steps.publish.output").expect("output").is_valid());
}

#[test]
fn configure_failure_stops_preflight() {
    let probe = ConfigureProbe::new();
    let resolver = ComponentResolver::new(recording_registry(&probe));
    let config = ConfigTree::load_from_str(
        r#"{ steps: { load: { input: { type: "failing" } } } }"#,
    )
    .expect("pipeline parses");

    let err = preflight(&config, &resolver, UnknownKeyPolicy::Reject).expect_err("fatal");

    assert_eq!(
        err.to_string(),
        "step load: failed to configure input failing: invalid configuration: rejected by stub"
    );
}
