//! Commands exposed by the `conveyor` binary.

use anyhow::{Context, Result};
use conveyor_components::{
    ComponentRegistry, ComponentResolver, PreflightReport, builtin_component_registry, preflight,
};
use conveyor_config::{ConfigTree, UnknownKeyPolicy};
use log::info;
use std::fmt::Write;
use std::path::Path;

/// Load a pipeline file and run the preflight against `registry`.
///
/// Resolution failures are returned as errors; rule failures and unknown keys
/// are part of the returned report.
pub fn validate_file(
    path: &Path,
    registry: ComponentRegistry,
    policy: UnknownKeyPolicy,
) -> Result<PreflightReport> {
    info!("validating pipeline (path={}, policy={:?})", path.display(), policy);
    let config = ConfigTree::load_from_path(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let resolver = ComponentResolver::new(registry);
    let preflight = preflight(&config, &resolver, policy)
        .with_context(|| format!("failed to resolve components in {}", path.display()))?;
    Ok(preflight.report)
}

/// Same as [`validate_file`] with the built-in components.
pub fn validate_builtin(path: &Path, policy: UnknownKeyPolicy) -> Result<PreflightReport> {
    validate_file(path, builtin_component_registry(), policy)
}

/// Render a report as text or pretty JSON.
pub fn render_report(report: &PreflightReport, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(report).context("failed to serialize report");
    }
    Ok(report.to_string())
}

/// Human-readable listing of registered implementations and aliases.
pub fn list_components(registry: &ComponentRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "implementations:");
    for component in registry.implementations() {
        let _ = writeln!(
            out,
            "  {} ({})",
            component.id,
            component.capabilities.join(", ")
        );
    }
    let _ = writeln!(out, "aliases:");
    for alias in registry.aliases() {
        let _ = writeln!(out, "  {} {} -> {}", alias.capability, alias.alias, alias.id);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn validate_builtin_accepts_clean_pipeline() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("pipeline.json5");
        fs::write(
            &path,
            r#"{ steps: { load: { input: { type: "filesystem", path: "/in", format: "json" } } } }"#,
        )
        .expect("write");

        let report = validate_builtin(&path, UnknownKeyPolicy::Reject).expect("report");
        assert!(report.is_clean(), "{report}");
    }

    #[test]
    fn unknown_keys_depend_on_policy() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("pipeline.json5");
        fs::write(
            &path,
            r#"{ steps: { load: { output: { type: "log", levle: "INFO" } } } }"#,
        )
        .expect("write");

        let rejected = validate_builtin(&path, UnknownKeyPolicy::Reject).expect("report");
        assert!(!rejected.is_clean());
        assert!(
            rejected
                .to_string()
                .contains("ERROR: unknown configuration keys: levle")
        );

        let warned = validate_builtin(&path, UnknownKeyPolicy::Warn).expect("report");
        assert!(warned.is_clean());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let err = validate_builtin(&dir.path().join("absent.json5"), UnknownKeyPolicy::Reject)
            .expect_err("missing file");
        assert!(err.to_string().starts_with("failed to load"));
    }

    #[test]
    fn unresolved_type_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("pipeline.json5");
        fs::write(&path, r#"{ steps: { load: { input: { type: "jdbc" } } } }"#).expect("write");

        let err = validate_builtin(&path, UnknownKeyPolicy::Reject).expect_err("unresolved");
        let chain = format!("{err:#}");
        assert!(chain.contains("could not resolve input type jdbc"), "{chain}");
    }

    #[test]
    fn json_rendering_includes_scopes() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("pipeline.json5");
        fs::write(&path, r#"{ steps: {} }"#).expect("write");

        let report = validate_builtin(&path, UnknownKeyPolicy::Reject).expect("report");
        let rendered = render_report(&report, true).expect("json");
        let value: serde_json::Value = serde_json::from_str(&rendered).expect("parse");
        assert_eq!(value["scopes"][0]["scope"], "pipeline");
    }

    #[test]
    fn listing_shows_aliases() {
        let listing = list_components(&builtin_component_registry());
        assert!(listing.contains("  conveyor.input.KafkaInput (input)"));
        assert!(listing.contains("  output log -> conveyor.output.LogOutput"));
    }
}
