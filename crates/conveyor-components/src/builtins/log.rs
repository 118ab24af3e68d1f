//! Output that writes records to the application log.

use super::utils::optional_str;
use crate::error::ComponentError;
use crate::resolver::TYPE_CONFIG_NAME;
use crate::{Component, Output, WriteMode};
use ::log::Level;
use conveyor_config::{ConfigTree, Validations, ValueType};

pub const LEVEL_CONFIG: &str = "level";
pub const DELIMITER_CONFIG: &str = "delimiter";

const LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

#[derive(Debug)]
pub struct LogOutput {
    level: Level,
    delimiter: String,
}

impl Default for LogOutput {
    fn default() -> Self {
        Self {
            level: Level::Info,
            delimiter: ",".to_string(),
        }
    }
}

impl LogOutput {
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }
}

impl Component for LogOutput {
    fn configure(&mut self, config: &ConfigTree) -> Result<(), ComponentError> {
        if let Some(level) = optional_str(config, LEVEL_CONFIG)? {
            self.level = level
                .parse()
                .map_err(|_| ComponentError::InvalidConfig(format!("unknown log level: {level}")))?;
        }
        if let Some(delimiter) = optional_str(config, DELIMITER_CONFIG)? {
            self.delimiter = delimiter;
        }
        Ok(())
    }

    fn validations(&self) -> Validations {
        Validations::builder()
            .allowed_values(LEVEL_CONFIG, LEVELS)
            .optional_path(DELIMITER_CONFIG, ValueType::String)
            .handles_path(TYPE_CONFIG_NAME)
            .build()
    }
}

impl Output for LogOutput {
    fn write_modes(&self) -> &'static [WriteMode] {
        &[WriteMode::Append]
    }
}
