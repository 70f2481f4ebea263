//! ythook command-line entry point

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ythook::cli::{Cli, Commands, ConfigCommands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Simulate(args) => commands::simulate::handle(&args, cli.config.as_deref()),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(cli.config.as_deref()),
            ConfigCommands::Path => commands::config::handle_path(cli.config.as_deref()),
            ConfigCommands::Init => commands::config::handle_init(cli.config.as_deref()),
        },
        Commands::Completions { shell } => {
            commands::completions::handle(shell);
            Ok(())
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
