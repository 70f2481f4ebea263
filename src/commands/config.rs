//! Config subcommands handler

use std::path::{Path, PathBuf};

use anyhow::Result;
use ythook::Config;

use super::load_config;

fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_path(),
    }
}

/// Show current configuration as TOML.
#[cfg(not(tarpaulin_include))]
pub fn handle_show(explicit: Option<&Path>) -> Result<()> {
    let config = load_config(explicit)?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Print where the configuration file lives.
#[cfg(not(tarpaulin_include))]
pub fn handle_path(explicit: Option<&Path>) -> Result<()> {
    println!("{}", resolve_path(explicit)?.display());
    Ok(())
}

/// Write a default configuration file unless one exists.
#[cfg(not(tarpaulin_include))]
pub fn handle_init(explicit: Option<&Path>) -> Result<()> {
    let path = resolve_path(explicit)?;
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    Config::default().save_to(&path)?;
    println!("Created {}", path.display());
    Ok(())
}
