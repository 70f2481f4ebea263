//! Simulate command handler

use std::path::Path;

use anyhow::{Context, Result};
use ythook::cli::SimulateArgs;
use ythook::sim::{self, PlaybackScript};

use super::load_config;

/// Run a playback script and print the report.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: &SimulateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let script = PlaybackScript::load(&args.script)?;

    let report = sim::run(&script, &config.scheduler)
        .with_context(|| format!("Simulation of {} failed", args.script.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
