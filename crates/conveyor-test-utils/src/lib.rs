//! Test helpers shared across Conveyor crates.

pub mod components;
pub mod registry;

pub use components::{ConfigureProbe, FailingInput, RecordingInput, RecordingOutput};
pub use registry::{
    FAILING_INPUT_ID, RECORDING_INPUT_ID, RECORDING_OUTPUT_ID, recording_registry,
};
