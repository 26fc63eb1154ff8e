//! CLI command definitions using Clap.
//!
//! - `check` - Validates the configuration and prints what it sets up
//! - `config_cmd` - Configuration file scaffolding

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::{TesseraError, TesseraResult};
use crate::{config, schema};

pub mod check;
pub mod config_cmd;

pub use config_cmd::ConfigCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tessera - a tiling window manager.
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Run the window manager. This is the default when no command is given.
    Run,

    /// Validate the configuration file.
    ///
    /// Prints the workspaces, keybindings, and routes the configuration sets up,
    /// and fails when a chord or command id is not recognised.
    CheckConfig {
        /// Print the parsed configuration as JSON instead of tables.
        #[arg(long)]
        json: bool,
    },

    /// Output the configuration JSON Schema.
    ///
    /// Can be redirected to a file for use with editors that support JSON Schema
    /// validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(tessera completions --shell zsh)"
    ///   tessera completions --shell fish > ~/.config/fish/completions/tessera.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },

    /// Configuration file management commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> TesseraResult<()> {
        if let Some(path) = self.config_path() {
            if !path.exists() {
                return Err(TesseraError::InvalidArguments(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            config::set_custom_config_path(path);
        }

        match self.command.as_ref().unwrap_or(&Commands::Run) {
            Commands::Run => crate::run(),
            Commands::CheckConfig { json } => check::execute(*json),
            Commands::Config(cmd) => config_cmd::execute(cmd),
            Commands::Schema => {
                println!("{}", schema::generate_schema_json());
                Ok(())
            }
            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "tessera", &mut io::stdout());
    }
}
