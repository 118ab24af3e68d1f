//! Command-line entry point for Conveyor.

use anyhow::bail;
use clap::{Parser, Subcommand};
use conveyor_components::builtin_component_registry;
use conveyor_config::UnknownKeyPolicy;
use conveyor_rs::commands::{list_components, render_report, validate_builtin};
use log::info;
use std::path::PathBuf;

/// Command-line options for the Conveyor tool.
#[derive(Parser)]
#[command(name = "conveyor", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve and validate a pipeline configuration file
    Validate {
        /// Path to a JSON5 pipeline file
        file: PathBuf,
        /// Report unknown keys as warnings instead of errors
        #[arg(long)]
        allow_unknown_keys: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List registered components and aliases
    Components,
}

fn main() -> anyhow::Result<()> {
    conveyor_rs::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Validate {
            file,
            allow_unknown_keys,
            json,
        } => {
            let policy = if allow_unknown_keys {
                UnknownKeyPolicy::Warn
            } else {
                UnknownKeyPolicy::Reject
            };
            let report = validate_builtin(&file, policy)?;
            print!("{}", render_report(&report, json)?);
            if !report.is_clean() {
                bail!("{} failed validation", file.display());
            }
            info!("{} passed validation", file.display());
        }
        Command::Components => {
            print!("{}", list_components(&builtin_component_registry()));
        }
    }
    Ok(())
}
