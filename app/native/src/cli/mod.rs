//! Command-line interface for Tessera.
//!
//! Without a subcommand the window manager runs in the foreground. The other
//! subcommands inspect or scaffold the configuration and exit.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::TesseraResult;

/// Parses command-line arguments and executes the selected command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> TesseraResult<()> {
    let cli = Cli::parse();
    cli.execute()
}
