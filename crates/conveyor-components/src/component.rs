//! Pluggable component contract and the capabilities the resolver can produce.

use crate::error::ComponentError;
use conveyor_config::schema::StructType;
use conveyor_config::{ConfigTree, Validations};
use serde::Serialize;
use std::fmt::Debug;

/// Shared contract of every pluggable component.
pub trait Component: Send + Sync + Debug {
    /// Extract options from the component's own config sub-tree.
    fn configure(&mut self, config: &ConfigTree) -> Result<(), ComponentError>;

    /// Rules covering the component's options, run in a later validation pass.
    fn validations(&self) -> Validations {
        Validations::default()
    }
}

/// A component trait object the registry can construct.
///
/// Implemented for `dyn Input` and `dyn Output`; `NAME` appears in diagnostics.
pub trait Capability: Component + 'static {
    const NAME: &'static str;
}

/// Data-source stage.
pub trait Input: Component {
    /// Whether the input produces an unbounded stream.
    fn is_streaming(&self) -> bool {
        false
    }

    /// Declared record schema, when the input carries one.
    fn schema(&self) -> Option<&StructType> {
        None
    }
}

/// Data-sink stage.
pub trait Output: Component {
    /// Write modes the output accepts.
    fn write_modes(&self) -> &'static [WriteMode];
}

/// How an output applies records to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    Append,
    Overwrite,
    Upsert,
    Delete,
}

impl Capability for dyn Input {
    const NAME: &'static str = "input";
}

impl Capability for dyn Output {
    const NAME: &'static str = "output";
}
