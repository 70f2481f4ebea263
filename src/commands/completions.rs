//! Shell completion generation

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use ythook::cli::Cli;

#[cfg(not(tarpaulin_include))]
pub fn handle(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "ythook", &mut io::stdout());
}
