#![allow(clippy::multiple_crate_versions)]

//! Tessera binary.
//!
//! Without arguments it runs the window manager; subcommands inspect and scaffold
//! the configuration.

fn main() {
    if let Err(err) = tessera_lib::cli::run() {
        eprintln!("tessera: {err}");
        std::process::exit(1);
    }
}
