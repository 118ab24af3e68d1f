//! Option helpers shared by built-in components.

use crate::error::ComponentError;
use conveyor_config::ConfigTree;
use conveyor_config::schema::{StructType, parse_schema, struct_type_for};

/// Read an optional string option.
pub(super) fn optional_str(
    config: &ConfigTree,
    path: &str,
) -> Result<Option<String>, ComponentError> {
    if !config.has_path(path) {
        return Ok(None);
    }
    Ok(Some(config.get_str(path)?.to_string()))
}

/// Read an optional boolean option.
pub(super) fn optional_bool(config: &ConfigTree, path: &str) -> Result<Option<bool>, ComponentError> {
    if !config.has_path(path) {
        return Ok(None);
    }
    Ok(Some(config.get_bool(path)?))
}

/// Parse and convert an optional schema literal option.
pub(super) fn optional_schema(
    config: &ConfigTree,
    path: &str,
) -> Result<Option<StructType>, ComponentError> {
    let Some(text) = optional_str(config, path)? else {
        return Ok(None);
    };
    let literal = parse_schema(&text)
        .map_err(|err| ComponentError::InvalidConfig(format!("{path}: {err}")))?;
    let struct_type = struct_type_for(&literal)
        .map_err(|err| ComponentError::InvalidConfig(format!("{path}: {err}")))?;
    Ok(Some(struct_type))
}
