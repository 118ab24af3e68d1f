//! Built-in components bundled with Conveyor.

mod filesystem;
mod hbase;
mod kafka;
mod log;
mod utils;

use crate::{ComponentRegistry, Input, Output};

pub use filesystem::{FileFormat, FileSystemInput};
pub use hbase::{HBaseColumn, HBaseOutput};
pub use kafka::{KafkaInput, Subscription};
pub use log::LogOutput;

pub const FILESYSTEM_INPUT_ID: &str = "conveyor.input.FileSystemInput";
pub const KAFKA_INPUT_ID: &str = "conveyor.input.KafkaInput";
pub const HBASE_OUTPUT_ID: &str = "conveyor.output.HBaseOutput";
pub const LOG_OUTPUT_ID: &str = "conveyor.output.LogOutput";

/// Register all built-in components and their short aliases.
pub fn register_builtin_components(registry: &ComponentRegistry) {
    registry.register::<dyn Input, _>(FILESYSTEM_INPUT_ID, || {
        Box::new(FileSystemInput::default())
    });
    registry.register::<dyn Input, _>(KAFKA_INPUT_ID, || Box::new(KafkaInput::default()));
    registry.register::<dyn Output, _>(HBASE_OUTPUT_ID, || Box::new(HBaseOutput::default()));
    registry.register::<dyn Output, _>(LOG_OUTPUT_ID, || Box::new(LogOutput::default()));

    registry.register_alias::<dyn Input>("filesystem", FILESYSTEM_INPUT_ID);
    registry.register_alias::<dyn Input>("kafka", KAFKA_INPUT_ID);
    registry.register_alias::<dyn Output>("hbase", HBASE_OUTPUT_ID);
    registry.register_alias::<dyn Output>("log", LOG_OUTPUT_ID);
    ::log::info!("registered built-in components");
}

/// Build a registry pre-populated with built-in components.
pub fn builtin_component_registry() -> ComponentRegistry {
    let registry = ComponentRegistry::new();
    register_builtin_components(&registry);
    registry
}
