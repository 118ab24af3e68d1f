//! Output writing rows to an HBase table through a column mapping.
//!
//! The mapping names each logical column and declares its physical column
//! qualifier, column family and type:
//!
//! ```json5
//! {
//!   type: "hbase",
//!   table: { name: "events" },
//!   mapping: {
//!     rowkey: ["id"],
//!     columns: {
//!       id: { cf: "rowkey", col: "id", type: "string" },
//!       amount: { cf: "d", col: "amt", type: "long" },
//!     },
//!   },
//! }
//! ```

use super::utils::optional_str;
use crate::error::ComponentError;
use crate::resolver::TYPE_CONFIG_NAME;
use crate::{Component, Output, WriteMode};
use conveyor_config::validation::StructuralMap;
use conveyor_config::{ConfigTree, Validations, ValueType, join_path};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const TABLE_NAME_CONFIG: &str = "table.name";
pub const ROWKEY_CONFIG: &str = "mapping.rowkey";
pub const COLUMNS_CONFIG: &str = "mapping.columns";
pub const ZOOKEEPER_CONFIG: &str = "zookeeper";

/// Sub-fields every column entry must declare.
pub const COLUMN_FIELDS: [&str; 3] = ["col", "type", "cf"];

/// Physical placement of one logical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HBaseColumn {
    pub family: String,
    pub qualifier: String,
    pub data_type: String,
}

#[derive(Debug, Default)]
pub struct HBaseOutput {
    table: String,
    rowkey: Vec<String>,
    columns: BTreeMap<String, HBaseColumn>,
    zookeeper: Option<String>,
}

impl HBaseOutput {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn rowkey(&self) -> &[String] {
        &self.rowkey
    }

    pub fn columns(&self) -> &BTreeMap<String, HBaseColumn> {
        &self.columns
    }

    pub fn zookeeper(&self) -> Option<&str> {
        self.zookeeper.as_deref()
    }
}

fn column_field(
    entry: &str,
    fields: &Map<String, Value>,
    field: &str,
) -> Result<String, ComponentError> {
    fields
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ComponentError::InvalidConfig(format!(
                "'{field}' not specified as a string in column {entry}"
            ))
        })
}

impl Component for HBaseOutput {
    fn configure(&mut self, config: &ConfigTree) -> Result<(), ComponentError> {
        self.table = config.get_str(TABLE_NAME_CONFIG)?.to_string();
        self.rowkey = config.get_string_list(ROWKEY_CONFIG)?;
        self.zookeeper = optional_str(config, ZOOKEEPER_CONFIG)?;

        let columns = config.get_typed(COLUMNS_CONFIG, ValueType::Object)?;
        self.columns.clear();
        for (name, entry) in columns.as_object().into_iter().flatten() {
            let fields = entry.as_object().ok_or_else(|| {
                ComponentError::InvalidConfig(format!(
                    "{} must be an object",
                    join_path(COLUMNS_CONFIG, name)
                ))
            })?;
            self.columns.insert(
                name.clone(),
                HBaseColumn {
                    family: column_field(name, fields, "cf")?,
                    qualifier: column_field(name, fields, "col")?,
                    data_type: column_field(name, fields, "type")?,
                },
            );
        }

        if let Some(missing) = self.rowkey.iter().find(|key| !self.columns.contains_key(*key)) {
            return Err(ComponentError::InvalidConfig(format!(
                "rowkey column {missing} is not declared in {COLUMNS_CONFIG}"
            )));
        }
        Ok(())
    }

    fn validations(&self) -> Validations {
        Validations::builder()
            .mandatory_path(TABLE_NAME_CONFIG, Some(ValueType::String))
            .mandatory_path(ROWKEY_CONFIG, Some(ValueType::List))
            .mandatory_path(COLUMNS_CONFIG, Some(ValueType::Object))
            .add(
                StructuralMap::new(COLUMNS_CONFIG, COLUMN_FIELDS)
                    .with_fixed_paths([TABLE_NAME_CONFIG, ROWKEY_CONFIG]),
            )
            .optional_path(ZOOKEEPER_CONFIG, ValueType::String)
            .handles_path(TYPE_CONFIG_NAME)
            .build()
    }
}

impl Output for HBaseOutput {
    fn write_modes(&self) -> &'static [WriteMode] {
        &[WriteMode::Upsert, WriteMode::Delete]
    }
}
