//! Parser for Avro-style JSON record schema literals.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors raised while parsing a schema literal.
#[derive(Debug, Error)]
pub enum SchemaParseError {
    /// The literal is not JSON.
    #[error("schema literal is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A JSON value that cannot describe a schema.
    #[error("not a schema: {0}")]
    NotASchema(String),
    /// A type name that is neither primitive nor previously defined.
    #[error("unknown type: {0}")]
    UnknownType(String),
    /// A required attribute is missing or has the wrong shape.
    #[error("{schema} schema requires {attribute}")]
    MissingAttribute {
        schema: &'static str,
        attribute: &'static str,
    },
    /// Two fields of one record share a name.
    #[error("record {record} declares field {field} more than once")]
    DuplicateField { record: String, field: String },
    /// Two named types share a name.
    #[error("type {0} is defined more than once")]
    DuplicateName(String),
    /// A nested, empty or ambiguous union.
    #[error("invalid union: {0}")]
    InvalidUnion(String),
}

/// Parsed schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record(RecordSchema),
    Enum { name: String, symbols: Vec<String> },
    Array(Box<Schema>),
    Map(Box<Schema>),
    Fixed { name: String, size: u64 },
    Union(Vec<Schema>),
    /// Reference, by full name, to a named type defined elsewhere in the literal.
    Ref(String),
}

impl Schema {
    /// Short type label used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bytes => "bytes",
            Self::String => "string",
            Self::Record(_) => "record",
            Self::Enum { .. } => "enum",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Fixed { .. } => "fixed",
            Self::Union(_) => "union",
            Self::Ref(name) => name,
        }
    }

    /// Identity of a union branch: named types by full name, others by type.
    fn branch_key(&self) -> &str {
        match self {
            Self::Record(record) => &record.name,
            Self::Enum { name, .. } | Self::Fixed { name, .. } | Self::Ref(name) => name,
            other => other.type_name(),
        }
    }
}

/// Named types carry their full, namespace-qualified name.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub schema: Schema,
    pub default: Option<Value>,
}

/// A parsed literal: the root schema plus every named type it defines.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSchema {
    pub root: Schema,
    pub named: BTreeMap<String, Schema>,
}

/// Parse schema text.
pub fn parse_schema(text: &str) -> Result<ParsedSchema, SchemaParseError> {
    let value: Value = serde_json::from_str(text)?;
    let mut parser = Parser::default();
    let root = parser.parse(&value)?;
    Ok(ParsedSchema {
        root,
        named: parser.named,
    })
}

#[derive(Default)]
struct Parser {
    named: BTreeMap<String, Schema>,
    // Names whose definition is still being parsed; references to them are legal.
    pending: BTreeSet<String>,
    // Namespace of the innermost enclosing named type.
    namespace: Option<String>,
}

impl Parser {
    fn parse(&mut self, value: &Value) -> Result<Schema, SchemaParseError> {
        match value {
            Value::String(name) => self.parse_name(name),
            Value::Array(branches) => self.parse_union(branches),
            Value::Object(map) => self.parse_object(map),
            other => Err(SchemaParseError::NotASchema(other.to_string())),
        }
    }

    fn parse_name(&self, name: &str) -> Result<Schema, SchemaParseError> {
        if let Some(primitive) = primitive(name) {
            return Ok(primitive);
        }
        let qualified = match &self.namespace {
            Some(namespace) if !name.contains('.') => Some(format!("{namespace}.{name}")),
            _ => None,
        };
        for candidate in qualified.iter().map(String::as_str).chain([name]) {
            if self.is_defined(candidate) {
                return Ok(Schema::Ref(candidate.to_string()));
            }
        }
        Err(SchemaParseError::UnknownType(name.to_string()))
    }

    fn is_defined(&self, fullname: &str) -> bool {
        self.named.contains_key(fullname) || self.pending.contains(fullname)
    }

    fn parse_union(&mut self, branches: &[Value]) -> Result<Schema, SchemaParseError> {
        if branches.is_empty() {
            return Err(SchemaParseError::InvalidUnion("union has no branches".into()));
        }
        let mut parsed = Vec::with_capacity(branches.len());
        let mut seen = BTreeSet::new();
        for branch in branches {
            let schema = self.parse(branch)?;
            if matches!(schema, Schema::Union(_)) {
                return Err(SchemaParseError::InvalidUnion(
                    "unions may not immediately contain other unions".into(),
                ));
            }
            if !seen.insert(schema.branch_key().to_string()) {
                return Err(SchemaParseError::InvalidUnion(format!(
                    "duplicate branch {}",
                    schema.branch_key()
                )));
            }
            parsed.push(schema);
        }
        Ok(Schema::Union(parsed))
    }

    fn parse_object(&mut self, map: &Map<String, Value>) -> Result<Schema, SchemaParseError> {
        let type_name = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or(SchemaParseError::MissingAttribute {
                schema: "complex",
                attribute: "a string 'type'",
            })?;
        match type_name {
            "record" | "error" => self.parse_record(map),
            "enum" => self.parse_enum(map),
            "array" => {
                let items = map.get("items").ok_or(SchemaParseError::MissingAttribute {
                    schema: "array",
                    attribute: "'items'",
                })?;
                Ok(Schema::Array(Box::new(self.parse(items)?)))
            }
            "map" => {
                let values = map.get("values").ok_or(SchemaParseError::MissingAttribute {
                    schema: "map",
                    attribute: "'values'",
                })?;
                Ok(Schema::Map(Box::new(self.parse(values)?)))
            }
            "fixed" => {
                let name = self.define_name(map, "fixed")?;
                let size = map.get("size").and_then(Value::as_u64).ok_or(
                    SchemaParseError::MissingAttribute {
                        schema: "fixed",
                        attribute: "a non-negative integer 'size'",
                    },
                )?;
                let schema = Schema::Fixed {
                    name: name.clone(),
                    size,
                };
                self.named.insert(name, schema.clone());
                Ok(schema)
            }
            other => self.parse_name(other),
        }
    }

    fn parse_record(&mut self, map: &Map<String, Value>) -> Result<Schema, SchemaParseError> {
        let name = self.define_name(map, "record")?;
        let fields = map.get("fields").and_then(Value::as_array).ok_or(
            SchemaParseError::MissingAttribute {
                schema: "record",
                attribute: "a 'fields' array",
            },
        )?;

        self.pending.insert(name.clone());
        let namespace = Some(namespace_of(&name))
            .filter(|namespace| !namespace.is_empty())
            .map(str::to_string);
        let enclosing = std::mem::replace(&mut self.namespace, namespace);
        let parsed = self.parse_fields(&name, fields);
        self.namespace = enclosing;
        let parsed = parsed?;
        self.pending.remove(&name);

        let schema = Schema::Record(RecordSchema {
            name: name.clone(),
            fields: parsed,
        });
        self.named.insert(name, schema.clone());
        Ok(schema)
    }

    fn parse_fields(
        &mut self,
        record: &str,
        fields: &[Value],
    ) -> Result<Vec<FieldSchema>, SchemaParseError> {
        let mut parsed = Vec::with_capacity(fields.len());
        let mut seen = BTreeSet::new();
        for field in fields {
            let field = field.as_object().ok_or(SchemaParseError::MissingAttribute {
                schema: "record",
                attribute: "object fields",
            })?;
            let field_name = field.get("name").and_then(Value::as_str).ok_or(
                SchemaParseError::MissingAttribute {
                    schema: "field",
                    attribute: "a string 'name'",
                },
            )?;
            if !seen.insert(field_name.to_string()) {
                return Err(SchemaParseError::DuplicateField {
                    record: record.to_string(),
                    field: field_name.to_string(),
                });
            }
            let field_type = field.get("type").ok_or(SchemaParseError::MissingAttribute {
                schema: "field",
                attribute: "'type'",
            })?;
            parsed.push(FieldSchema {
                name: field_name.to_string(),
                schema: self.parse(field_type)?,
                default: field.get("default").cloned(),
            });
        }
        Ok(parsed)
    }

    fn parse_enum(&mut self, map: &Map<String, Value>) -> Result<Schema, SchemaParseError> {
        let name = self.define_name(map, "enum")?;
        let symbols = map
            .get("symbols")
            .and_then(Value::as_array)
            .and_then(|symbols| {
                symbols
                    .iter()
                    .map(|symbol| symbol.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
            })
            .ok_or(SchemaParseError::MissingAttribute {
                schema: "enum",
                attribute: "a 'symbols' array of strings",
            })?;
        let schema = Schema::Enum {
            name: name.clone(),
            symbols,
        };
        self.named.insert(name, schema.clone());
        Ok(schema)
    }

    /// Full name of a named type: a dotted `name` as is, otherwise qualified by
    /// its own `namespace` or the enclosing one.
    fn define_name(
        &self,
        map: &Map<String, Value>,
        schema: &'static str,
    ) -> Result<String, SchemaParseError> {
        let name = map
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or(SchemaParseError::MissingAttribute {
                schema,
                attribute: "a non-empty 'name'",
            })?;
        let namespace = match map.get("namespace") {
            Some(Value::String(namespace)) => Some(namespace.as_str()),
            Some(Value::Null) | None => self.namespace.as_deref(),
            Some(_) => {
                return Err(SchemaParseError::MissingAttribute {
                    schema,
                    attribute: "a string 'namespace'",
                });
            }
        };
        let fullname = match namespace {
            _ if name.contains('.') => name.to_string(),
            Some(namespace) if !namespace.is_empty() => format!("{namespace}.{name}"),
            _ => name.to_string(),
        };
        if self.is_defined(&fullname) {
            return Err(SchemaParseError::DuplicateName(fullname));
        }
        Ok(fullname)
    }
}

/// Namespace part of a full name, empty for the null namespace.
fn namespace_of(fullname: &str) -> &str {
    fullname.rsplit_once('.').map_or("", |(namespace, _)| namespace)
}

fn primitive(name: &str) -> Option<Schema> {
    let schema = match name {
        "null" => Schema::Null,
        "boolean" => Schema::Boolean,
        "int" => Schema::Int,
        "long" => Schema::Long,
        "float" => Schema::Float,
        "double" => Schema::Double,
        "bytes" => Schema::Bytes,
        "string" => Schema::String,
        _ => return None,
    };
    Some(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_record_with_nested_types() {
        let literal = parse_schema(
            r#"{
                "type": "record",
                "name": "Event",
                "fields": [
                    { "name": "id", "type": "long" },
                    { "name": "tags", "type": { "type": "array", "items": "string" } },
                    { "name": "note", "type": ["null", "string"], "default": null }
                ]
            }"#,
        )
        .expect("parse");

        let Schema::Record(record) = &literal.root else {
            panic!("expected record, got {:?}", literal.root);
        };
        assert_eq!(record.name, "Event");
        assert_eq!(record.fields.len(), 3);
        assert_eq!(
            record.fields[1].schema,
            Schema::Array(Box::new(Schema::String))
        );
        assert!(literal.named.contains_key("Event"));
    }

    #[test]
    fn rejects_text_that_is_not_json() {
        let err = parse_schema("{ not json").unwrap_err();
        assert!(matches!(err, SchemaParseError::Json(_)));
    }

    #[test]
    fn rejects_unknown_type_names() {
        let err = parse_schema(r#"{"type":"record","name":"R","fields":[{"name":"a","type":"varchar"}]}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown type: varchar");
    }

    #[test]
    fn rejects_duplicate_fields() {
        let err = parse_schema(
            r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"},{"name":"a","type":"long"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaParseError::DuplicateField { .. }));
    }

    #[test]
    fn resolves_references_within_namespace() {
        let literal = parse_schema(
            r#"{
                "type": "record",
                "name": "Event",
                "namespace": "com.x",
                "fields": [
                    { "name": "kind", "type": { "type": "enum", "name": "E", "symbols": ["A", "B"] } },
                    { "name": "previous", "type": ["null", "com.x.E"] },
                    { "name": "next", "type": ["null", "E"] }
                ]
            }"#,
        )
        .expect("parse");

        let Schema::Record(record) = &literal.root else {
            panic!("expected record, got {:?}", literal.root);
        };
        assert_eq!(record.name, "com.x.Event");
        assert!(literal.named.contains_key("com.x.E"));
        assert_eq!(
            record.fields[2].schema,
            Schema::Union(vec![Schema::Null, Schema::Ref("com.x.E".into())])
        );
    }

    #[test]
    fn rejects_duplicate_union_branches() {
        let err = parse_schema(r#"["string", "string"]"#).unwrap_err();
        assert_eq!(err.to_string(), "invalid union: duplicate branch string");

        let err = parse_schema(
            r#"[{"type":"array","items":"int"},{"type":"array","items":"long"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaParseError::InvalidUnion(_)));
    }

    #[test]
    fn allows_self_references_while_parsing() {
        let literal = parse_schema(
            r#"{"type":"record","name":"Node","fields":[{"name":"next","type":["null","Node"]}]}"#,
        )
        .expect("parse");
        let Schema::Record(record) = literal.root else {
            panic!("expected record");
        };
        assert_eq!(
            record.fields[0].schema,
            Schema::Union(vec![Schema::Null, Schema::Ref("Node".into())])
        );
    }
}
