//! Mediated-device simulation harness.
//!
//! Wires the `mdev_pci` stub driver profile to an `mdev-core` registry,
//! seeds the dispatcher's ID table from the `--ids` string, and replays
//! scenario scripts of attach/detach and instance lifecycle events.

mod cli;
mod scenario;
mod stub;

use std::fs;
use std::io::Read;

use anyhow::{Context, Result, bail};
use clap::Parser;
use mdev_core::SharedRegistry;

/// Size cap of the `ids` configuration string, inherited from the original
/// module-parameter buffer.
const IDS_MAX_LEN: usize = 1024;

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Run(ref args) => cmd_run(&cli, args),
        cli::Command::Ids(ref args) => cmd_ids(args),
    }
}

/// Enforces the `ids` length cap; oversize input is an error, never a
/// silent truncation.
fn checked_ids(ids: &str) -> Result<&str> {
    if ids.len() > IDS_MAX_LEN {
        bail!(
            "ids string is {} bytes, the maximum is {IDS_MAX_LEN}",
            ids.len()
        );
    }
    Ok(ids)
}

/// Replay a scenario script against a fresh registry.
fn cmd_run(cli: &cli::Cli, args: &cli::RunArgs) -> Result<()> {
    let script = if args.script.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read script from stdin")?;
        buf
    } else {
        fs::read_to_string(&args.script)
            .with_context(|| format!("failed to read {}", args.script.display()))?
    };

    let registry = SharedRegistry::new();
    let mut dispatcher = stub::dispatcher(registry.clone());
    if let Some(ids) = cli.ids.as_deref() {
        for id in mdev_core::parse_id_table(checked_ids(ids)?) {
            dispatcher.add_id(id);
        }
    }
    log::debug!("seeded {} id rules", dispatcher.id_table().len());

    let directives = scenario::parse(&script)?;
    log::debug!("parsed {} directives", directives.len());
    scenario::execute(
        &dispatcher,
        &registry,
        &directives,
        &mut std::io::stdout().lock(),
    )
}

/// Parse an ID string and print the accepted rules in canonical form.
fn cmd_ids(args: &cli::IdsArgs) -> Result<()> {
    for id in mdev_core::parse_id_table(checked_ids(&args.string)?) {
        println!("{id}");
    }
    Ok(())
}
