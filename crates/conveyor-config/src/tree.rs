//! Immutable config tree addressed by dotted paths.
//!
//! The tree wraps a JSON value whose root is always an object. Lookups
//! distinguish "absent" from "present with the wrong type": an explicit
//! `null` counts as absent, everything else is present.

use crate::ConfigError;
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Discriminant of a config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    List,
    Object,
}

impl ValueType {
    /// Classify a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Object,
        }
    }

    /// Whether a value has this type.
    pub fn matches(self, value: &Value) -> bool {
        Self::of(value) == self
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// Read-only hierarchical configuration shared by every validation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    root: Map<String, Value>,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self { root: Map::new() }
    }
}

impl From<Map<String, Value>> for ConfigTree {
    fn from(root: Map<String, Value>) -> Self {
        Self { root }
    }
}

impl ConfigTree {
    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(ConfigError::NotAnObject(ValueType::of(&other))),
        }
    }

    /// Parse JSON5 text into a config tree.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        let value: Value = json5::from_str(contents)?;
        Self::from_value(value)
    }

    /// Read and parse a JSON5 file into a config tree.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("loading config tree (path={})", path.display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Root object of the tree.
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Whether the tree has no keys at all.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Look up a dotted path. Returns `None` for absent paths and explicit nulls.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                _ => return None,
            };
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    /// Whether a dotted path resolves to a non-null value.
    pub fn has_path(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Type of the value at a path, if present.
    pub fn value_type(&self, path: &str) -> Option<ValueType> {
        self.get(path).map(ValueType::of)
    }

    /// Read a value that must be present and of the given type.
    pub fn get_typed(&self, path: &str, expected: ValueType) -> Result<&Value, ConfigError> {
        let value = self.get(path).ok_or_else(|| ConfigError::Missing {
            path: path.to_string(),
        })?;
        let actual = ValueType::of(value);
        if actual != expected {
            return Err(ConfigError::WrongType {
                path: path.to_string(),
                expected,
                actual,
            });
        }
        Ok(value)
    }

    /// Read a string value.
    pub fn get_str(&self, path: &str) -> Result<&str, ConfigError> {
        let value = self.get_typed(path, ValueType::String)?;
        Ok(value.as_str().unwrap_or_default())
    }

    /// Read a boolean value.
    pub fn get_bool(&self, path: &str) -> Result<bool, ConfigError> {
        let value = self.get_typed(path, ValueType::Boolean)?;
        Ok(value.as_bool().unwrap_or_default())
    }

    /// Read an integer value.
    pub fn get_i64(&self, path: &str) -> Result<i64, ConfigError> {
        let value = self.get_typed(path, ValueType::Number)?;
        value
            .as_i64()
            .ok_or_else(|| ConfigError::invalid_field(path, "expected an integer"))
    }

    /// Read a list of strings.
    pub fn get_string_list(&self, path: &str) -> Result<Vec<String>, ConfigError> {
        let value = self.get_typed(path, ValueType::List)?;
        let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ConfigError::invalid_field(format!("{path}[{idx}]"), "expected string")
                })
            })
            .collect()
    }

    /// Extract the object at a path as its own tree.
    pub fn sub_tree(&self, path: &str) -> Result<ConfigTree, ConfigError> {
        match self.get_typed(path, ValueType::Object)? {
            Value::Object(map) => Ok(ConfigTree::from(map.clone())),
            _ => Ok(ConfigTree::default()),
        }
    }

    /// Every leaf path in the tree.
    ///
    /// Scalars and lists are leaves. Nulls and empty objects contribute nothing.
    pub fn leaf_paths(&self) -> BTreeSet<String> {
        let mut leaves = BTreeSet::new();
        collect_leaves(&self.root, "", &mut leaves);
        leaves
    }
}

/// Depth-first walk that records the dotted path of every leaf.
///
/// A key containing `.` cannot be reached by a dotted lookup, so its segment is
/// quoted and never matches a declared path.
fn collect_leaves(map: &Map<String, Value>, prefix: &str, leaves: &mut BTreeSet<String>) {
    for (key, value) in map {
        let path = if key.contains('.') {
            join_path(prefix, &format!("\"{key}\""))
        } else {
            join_path(prefix, key)
        };
        match value {
            Value::Null => {}
            Value::Object(child) => collect_leaves(child, &path, leaves),
            _ => {
                leaves.insert(path);
            }
        }
    }
}

/// Join a prefix and key into a dotted path.
pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree(value: Value) -> ConfigTree {
        ConfigTree::from_value(value).expect("tree")
    }

    #[test]
    fn lookup_distinguishes_absent_from_wrong_type() {
        let config = tree(json!({ "a": { "b": 1, "c": null } }));
        assert_eq!(config.get("a.b"), Some(&json!(1)));
        assert!(!config.has_path("a.c"));
        assert!(!config.has_path("a.b.c"));
        assert!(!config.has_path("missing"));

        let err = config.get_str("a.b").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WrongType {
                expected: ValueType::String,
                actual: ValueType::Number,
                ..
            }
        ));
        assert!(matches!(
            config.get_str("a.z"),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn leaf_paths_flatten_nested_objects() {
        let config = tree(json!({
            "a": { "b": 1, "c": { "d": "x" }, "empty": {} },
            "list": [1, 2],
            "gone": null
        }));
        let leaves: Vec<String> = config.leaf_paths().into_iter().collect();
        assert_eq!(leaves, vec!["a.b", "a.c.d", "list"]);
    }

    #[test]
    fn dotted_keys_are_quoted_leaves() {
        let config = tree(json!({ "hello.x": 99, "a": { "b.c": true } }));
        let leaves: Vec<String> = config.leaf_paths().into_iter().collect();
        assert_eq!(leaves, vec!["\"hello.x\"", "a.\"b.c\""]);
        assert!(!config.has_path("hello.x"));
    }

    #[test]
    fn rejects_non_object_root() {
        let err = ConfigTree::from_value(json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "config root must be an object, found list");
    }

    #[test]
    fn loads_json5_text() {
        let config = ConfigTree::load_from_str("{ hello: 2, nested: { name: 'x' } }").expect("load");
        assert_eq!(config.get_i64("hello").expect("int"), 2);
        assert_eq!(config.get_str("nested.name").expect("str"), "x");
        assert_eq!(
            config.sub_tree("nested").expect("sub").get_str("name").expect("str"),
            "x"
        );
    }

    #[test]
    fn reads_string_lists() {
        let config = tree(json!({ "topics": ["a", "b"], "mixed": ["a", 1] }));
        assert_eq!(
            config.get_string_list("topics").expect("list"),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(matches!(
            config.get_string_list("mixed"),
            Err(ConfigError::InvalidField { .. })
        ));
    }

    #[test]
    fn loads_from_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pipeline.json5");
        std::fs::write(&path, "// comment\n{ steps: { load: {} }, }").expect("write");

        let config = ConfigTree::load_from_path(&path).expect("load");
        assert!(config.has_path("steps.load"));

        let err = ConfigTree::load_from_path(&dir.path().join("absent.json5")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed(_)));

        std::fs::write(&path, "{ steps: ").expect("write");
        assert!(matches!(
            ConfigTree::load_from_path(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
