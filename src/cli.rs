//! Command-line interface definitions.
//!
//! Kept in the library so `xtask` can render the man page from the same
//! definitions the binary parses.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Timed hooks into embedded video players
#[derive(Debug, Parser)]
#[command(name = "ythook", version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a playback script against the hook scheduler on a virtual clock
    Simulate(SimulateArgs),

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Playback script (TOML)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file if none exists
    Init,
}
