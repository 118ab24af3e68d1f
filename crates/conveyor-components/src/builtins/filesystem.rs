//! Batch input reading files from a filesystem path.

use super::utils::{optional_bool, optional_schema};
use crate::error::ComponentError;
use crate::resolver::TYPE_CONFIG_NAME;
use crate::{Component, Input};
use conveyor_config::schema::StructType;
use conveyor_config::{ConfigTree, Validations, ValueType};
use conveyor_config::validation::OptionalPath;
use log::debug;

pub const PATH_CONFIG: &str = "path";
pub const FORMAT_CONFIG: &str = "format";
pub const HEADER_CONFIG: &str = "header";
pub const SCHEMA_LITERAL_CONFIG: &str = "schema.literal";

/// File formats the input can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Parquet,
    Json,
    Csv,
    Text,
}

impl FileFormat {
    const NAMES: [&'static str; 4] = ["parquet", "json", "csv", "text"];

    fn parse(name: &str) -> Option<Self> {
        match name {
            "parquet" => Some(Self::Parquet),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Input over files at a path.
#[derive(Debug, Default)]
pub struct FileSystemInput {
    path: String,
    format: Option<FileFormat>,
    header: bool,
    schema: Option<StructType>,
}

impl FileSystemInput {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn format(&self) -> Option<FileFormat> {
        self.format
    }

    pub fn header(&self) -> bool {
        self.header
    }
}

impl Component for FileSystemInput {
    fn configure(&mut self, config: &ConfigTree) -> Result<(), ComponentError> {
        self.path = config.get_str(PATH_CONFIG)?.to_string();
        let format = config.get_str(FORMAT_CONFIG)?;
        self.format = Some(FileFormat::parse(format).ok_or_else(|| {
            ComponentError::InvalidConfig(format!("unsupported file format: {format}"))
        })?);
        self.header = optional_bool(config, HEADER_CONFIG)?.unwrap_or(false);
        self.schema = optional_schema(config, SCHEMA_LITERAL_CONFIG)?;
        debug!(
            "configured filesystem input (path={}, format={})",
            self.path, format
        );
        Ok(())
    }

    fn validations(&self) -> Validations {
        Validations::builder()
            .mandatory_path(PATH_CONFIG, Some(ValueType::String))
            .mandatory_path(FORMAT_CONFIG, Some(ValueType::String))
            .allowed_values(FORMAT_CONFIG, FileFormat::NAMES)
            .if_path_has_value(
                FORMAT_CONFIG,
                "csv",
                OptionalPath::new(HEADER_CONFIG, ValueType::Boolean),
            )
            .schema_literal(SCHEMA_LITERAL_CONFIG)
            .handles_path(TYPE_CONFIG_NAME)
            .build()
    }
}

impl Input for FileSystemInput {
    fn schema(&self) -> Option<&StructType> {
        self.schema.as_ref()
    }
}
