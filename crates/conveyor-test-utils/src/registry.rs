use crate::components::{ConfigureProbe, FailingInput, RecordingInput, RecordingOutput};
use conveyor_components::{ComponentRegistry, Input, Output};

pub const RECORDING_INPUT_ID: &str = "test.RecordingInput";
pub const RECORDING_OUTPUT_ID: &str = "test.RecordingOutput";
pub const FAILING_INPUT_ID: &str = "test.FailingInput";

/// Registry holding the recording stubs under their ids and the `recording` alias,
/// plus a failing input aliased `failing`.
pub fn recording_registry(probe: &ConfigureProbe) -> ComponentRegistry {
    let registry = ComponentRegistry::new();
    let input_probe = probe.clone();
    registry.register::<dyn Input, _>(RECORDING_INPUT_ID, move || {
        Box::new(RecordingInput::new(input_probe.clone()))
    });
    let output_probe = probe.clone();
    registry.register::<dyn Output, _>(RECORDING_OUTPUT_ID, move || {
        Box::new(RecordingOutput::new(output_probe.clone()))
    });
    registry.register::<dyn Input, _>(FAILING_INPUT_ID, || {
        Box::new(FailingInput::new("rejected by stub"))
    });
    registry.register_alias::<dyn Input>("recording", RECORDING_INPUT_ID);
    registry.register_alias::<dyn Output>("recording", RECORDING_OUTPUT_ID);
    registry.register_alias::<dyn Input>("failing", FAILING_INPUT_ID);
    registry
}
