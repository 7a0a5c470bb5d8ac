//! Command-line interface definitions for mdevadm.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Mediated-device lifecycle simulation harness.
#[derive(Parser)]
#[command(name = "mdevadm", version, about)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Initial PCI IDs to add to the driver, format is
    /// "vendor:device[:subvendor[:subdevice[:class[:class_mask]]]]" with
    /// multiple comma-separated entries.
    #[arg(long, global = true)]
    pub ids: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Replay a scenario script against a fresh registry.
    Run(RunArgs),
    /// Parse an ID string and print the accepted rules in canonical form.
    Ids(IdsArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Parser)]
pub struct RunArgs {
    /// Scenario file, or `-` to read from stdin.
    pub script: PathBuf,
}

/// Arguments for the `ids` subcommand.
#[derive(Parser)]
pub struct IdsArgs {
    /// ID string to parse.
    pub string: String,
}
