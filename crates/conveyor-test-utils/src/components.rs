use conveyor_components::{Component, ComponentError, Input, Output, WriteMode};
use conveyor_config::{ConfigTree, Validations, ValueType};
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared log of the trees handed to `configure`.
#[derive(Debug, Clone, Default)]
pub struct ConfigureProbe {
    calls: Arc<Mutex<Vec<ConfigTree>>>,
}

impl ConfigureProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, config: &ConfigTree) {
        self.calls.lock().push(config.clone());
    }

    pub fn calls(&self) -> Vec<ConfigTree> {
        self.calls.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Input that records every configure call and owns a mandatory `path`.
#[derive(Debug, Clone, Default)]
pub struct RecordingInput {
    probe: ConfigureProbe,
}

impl RecordingInput {
    pub fn new(probe: ConfigureProbe) -> Self {
        Self { probe }
    }
}

impl Component for RecordingInput {
    fn configure(&mut self, config: &ConfigTree) -> Result<(), ComponentError> {
        self.probe.record(config);
        Ok(())
    }

    fn validations(&self) -> Validations {
        Validations::builder()
            .mandatory_path("path", Some(ValueType::String))
            .build()
    }
}

impl Input for RecordingInput {}

/// Output that records every configure call and declares no options.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    probe: ConfigureProbe,
}

impl RecordingOutput {
    pub fn new(probe: ConfigureProbe) -> Self {
        Self { probe }
    }
}

impl Component for RecordingOutput {
    fn configure(&mut self, config: &ConfigTree) -> Result<(), ComponentError> {
        self.probe.record(config);
        Ok(())
    }
}

impl Output for RecordingOutput {
    fn write_modes(&self) -> &'static [WriteMode] {
        &[WriteMode::Append, WriteMode::Overwrite]
    }
}

/// Input whose configure step always fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingInput {
    message: String,
}

impl FailingInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Component for FailingInput {
    fn configure(&mut self, _config: &ConfigTree) -> Result<(), ComponentError> {
        Err(ComponentError::InvalidConfig(self.message.clone()))
    }
}

impl Input for FailingInput {}
