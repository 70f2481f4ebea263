//! Subcommand handlers

pub mod completions;
pub mod config;
pub mod simulate;

use std::path::Path;

use anyhow::Result;
use ythook::Config;

/// Load the config from `--config` if given, else from the default location.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
