//! Embedded schema literals: parse, then convert to the typed-record model.

mod convert;
mod literal;

pub use convert::{DataType, SchemaConversionError, StructField, StructType, struct_type_for};
pub use literal::{
    FieldSchema, ParsedSchema, RecordSchema, Schema, SchemaParseError, parse_schema,
};
