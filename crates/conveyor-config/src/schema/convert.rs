//! Conversion of parsed schema literals into the typed-record model.

use super::literal::{ParsedSchema, Schema};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while converting a parsed schema into a [`StructType`].
#[derive(Debug, Error)]
pub enum SchemaConversionError {
    /// Only records map onto a typed record at the top level.
    #[error("top-level schema must be a record, found {0}")]
    NotARecord(String),
    /// Unions other than `[null, T]` have no typed-record equivalent.
    #[error("union with {0} non-null branches is not supported")]
    UnsupportedUnion(usize),
    /// A record refers to itself, directly or indirectly.
    #[error("recursive type {0} is not supported")]
    RecursiveType(String),
    /// A reference to a name the literal never defines.
    #[error("unresolved type reference {0}")]
    UnresolvedReference(String),
}

/// Column type of the typed-record model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataType {
    Null,
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    Binary,
    String,
    Array {
        element: Box<DataType>,
        contains_null: bool,
    },
    Map {
        value: Box<DataType>,
        value_contains_null: bool,
    },
    Struct(StructType),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructField {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

/// Ordered list of named, typed columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StructType {
    pub fields: Vec<StructField>,
}

impl StructType {
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Convert a parsed literal whose root is a record.
pub fn struct_type_for(literal: &ParsedSchema) -> Result<StructType, SchemaConversionError> {
    let mut converter = Converter {
        literal,
        visiting: Vec::new(),
    };
    match converter.resolve(&literal.root)? {
        Schema::Record(_) => match converter.convert(&literal.root)? {
            (DataType::Struct(struct_type), _) => Ok(struct_type),
            (other, _) => Err(SchemaConversionError::NotARecord(format!("{other:?}"))),
        },
        other => Err(SchemaConversionError::NotARecord(
            other.type_name().to_string(),
        )),
    }
}

struct Converter<'a> {
    literal: &'a ParsedSchema,
    visiting: Vec<String>,
}

impl<'a> Converter<'a> {
    fn resolve(&self, schema: &'a Schema) -> Result<&'a Schema, SchemaConversionError> {
        match schema {
            Schema::Ref(name) => self
                .literal
                .named
                .get(name)
                .ok_or_else(|| SchemaConversionError::UnresolvedReference(name.clone())),
            other => Ok(other),
        }
    }

    /// Returns the data type and whether the value may be null.
    fn convert(&mut self, schema: &'a Schema) -> Result<(DataType, bool), SchemaConversionError> {
        let schema = self.resolve(schema)?;
        let converted = match schema {
            Schema::Null => (DataType::Null, true),
            Schema::Boolean => (DataType::Boolean, false),
            Schema::Int => (DataType::Integer, false),
            Schema::Long => (DataType::Long, false),
            Schema::Float => (DataType::Float, false),
            Schema::Double => (DataType::Double, false),
            Schema::Bytes | Schema::Fixed { .. } => (DataType::Binary, false),
            Schema::String | Schema::Enum { .. } => (DataType::String, false),
            Schema::Array(items) => {
                let (element, contains_null) = self.convert(items)?;
                (
                    DataType::Array {
                        element: Box::new(element),
                        contains_null,
                    },
                    false,
                )
            }
            Schema::Map(values) => {
                let (value, value_contains_null) = self.convert(values)?;
                (
                    DataType::Map {
                        value: Box::new(value),
                        value_contains_null,
                    },
                    false,
                )
            }
            Schema::Union(branches) => {
                let non_null: Vec<&Schema> = branches
                    .iter()
                    .filter(|branch| !matches!(branch, Schema::Null))
                    .collect();
                let has_null = non_null.len() < branches.len();
                match non_null.as_slice() {
                    [] => (DataType::Null, true),
                    [single] => {
                        let (data_type, nullable) = self.convert(*single)?;
                        (data_type, nullable || has_null)
                    }
                    many => return Err(SchemaConversionError::UnsupportedUnion(many.len())),
                }
            }
            Schema::Record(record) => {
                if self.visiting.contains(&record.name) {
                    return Err(SchemaConversionError::RecursiveType(record.name.clone()));
                }
                self.visiting.push(record.name.clone());
                let mut fields = Vec::with_capacity(record.fields.len());
                for field in &record.fields {
                    let (data_type, nullable) = self.convert(&field.schema)?;
                    fields.push(StructField {
                        name: field.name.clone(),
                        data_type,
                        nullable,
                    });
                }
                self.visiting.pop();
                (DataType::Struct(StructType { fields }), false)
            }
            Schema::Ref(name) => {
                return Err(SchemaConversionError::UnresolvedReference(name.clone()));
            }
        };
        Ok(converted)
    }
}
