//! Public surface for Conveyor.
//!
//! Re-exports the configuration and component crates and hosts the command
//! implementations behind the `conveyor` binary.

pub mod commands;

/// Re-export for convenience.
pub use conveyor_components as components;
/// Re-export for convenience.
pub use conveyor_config as config;

#[inline]
/// Initialize logging with env_logger, honouring `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}
