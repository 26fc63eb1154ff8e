//! Config CLI commands.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;

use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{ConfigError, config_paths};
use crate::error::TesseraResult;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    ///
    /// Every option is written commented out, so the file documents what can be
    /// set and loads as the defaults until something is uncommented.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  tessera config init              # Create config at default location
  tessera config init --force      # Overwrite existing config
  tessera config init --path ~/my-config.jsonc  # Create at custom path
  tessera config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses the first search path.
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show where Tessera looks for its configuration file, and which one is in use.
    Path,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands) -> TesseraResult<()> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                init_config(*force, path.clone())
            }
        }
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
    }
}

fn init_config(force: bool, custom_path: Option<PathBuf>) -> TesseraResult<()> {
    let config_path = custom_path
        .or_else(|| config_paths().into_iter().next())
        .unwrap_or_else(|| PathBuf::from("config.jsonc"));

    if config_path.exists() && !force {
        return Err(ConfigError::Invalid(format!(
            "a configuration file already exists at {}, use --force to overwrite",
            config_path.display()
        ))
        .into());
    }

    create_config_file(&config_path)?;

    println!("Configuration file created at: {}", config_path.display().to_string().green());
    println!("\nAll options are commented out by default.");
    println!("Edit the file and uncomment the options you want to configure.");
    Ok(())
}

fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    let mut found_config = false;
    for (i, path) in config_paths().iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found_config {
            found_config = true;
            " (active)".green().to_string()
        } else if exists {
            " (exists)".dimmed().to_string()
        } else {
            String::new()
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found.");
        println!("Run 'tessera config init' to create one.");
    }
}
