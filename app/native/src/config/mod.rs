//! Configuration module for Tessera.
//!
//! This module provides configuration types, loading functionality, and file watching
//! for reloading keybindings when the file changes.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod template;
pub mod types;
mod watcher;

use std::path::PathBuf;
use std::sync::OnceLock;

pub use types::{
    BarConfig, ConfigError, GapsConfig, GraceWindowConfig, KeybindingCommands, LayoutEngineKind, LoggingConfig,
    MasterConfig, MasterPosition, ProcessorsConfig, RouteRule, RouterOptions, TesseraConfig, UncaughtErrorPolicy,
    WindowRule, WorkspaceConfig, config_paths, default_layout_engines, load_config as load_config_default,
    load_config_from_path,
};
pub use watcher::{watch_config_file, watch_path};

/// Global configuration instance, loaded once at startup.
static CONFIG: OnceLock<TesseraConfig> = OnceLock::new();

/// Path to the currently loaded configuration file.
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Custom config path override (set via CLI --config flag).
static CUSTOM_CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Sets a custom configuration file path to use instead of the default search paths.
///
/// This must be called before `init()` or `get_config()` to take effect.
///
/// # Returns
///
/// `true` if the path was set successfully, `false` if a path was already set.
pub fn set_custom_config_path(path: PathBuf) -> bool { CUSTOM_CONFIG_PATH.set(path).is_ok() }

/// Loads the configuration from the custom path, or the first default path that exists.
///
/// # Errors
///
/// Returns the error of [`load_config_from_path`], or `ConfigError::NotFound`.
pub fn load() -> Result<(TesseraConfig, PathBuf), ConfigError> {
    CUSTOM_CONFIG_PATH.get().map_or_else(load_config_default, |path| load_config_from_path(path))
}

/// Loads the configuration from disk.
///
/// Returns the loaded configuration, or a default configuration if loading fails.
/// If no configuration file exists, creates a template configuration file.
fn load_or_default() -> TesseraConfig {
    match load() {
        Ok((config, path)) => {
            let _ = CONFIG_PATH.set(path);
            config
        }
        Err(ConfigError::NotFound) => {
            create_default_config_file();
            TesseraConfig::default()
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            TesseraConfig::default()
        }
    }
}

/// Creates a template configuration file at the default location.
///
/// This is called when no configuration file is found during startup.
fn create_default_config_file() {
    let Some(config_path) = CUSTOM_CONFIG_PATH.get().cloned().or_else(|| config_paths().into_iter().next()) else {
        tracing::debug!("no config path available for creating template");
        return;
    };

    if config_path.exists() {
        return;
    }

    match template::create_config_file(&config_path) {
        Ok(()) => {
            let _ = CONFIG_PATH.set(config_path.clone());
            tracing::info!(path = %config_path.display(), "created default configuration file");
        }
        Err(err) => {
            tracing::debug!(
                error = %err,
                path = %config_path.display(),
                "failed to create default configuration file"
            );
        }
    }
}

/// Initializes and returns the global configuration instance.
///
/// This function is idempotent - calling it multiple times will return
/// the same configuration instance.
pub fn init() -> &'static TesseraConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the global configuration instance, initializing it if necessary.
pub fn get_config() -> &'static TesseraConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the path to the loaded configuration file, if any.
pub fn get_config_path() -> Option<&'static PathBuf> { CONFIG_PATH.get() }

/// Reads the loaded configuration file again. The global instance is left as it was;
/// callers apply what they can reload.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` when no file was loaded at startup, or the error
/// of [`load_config_from_path`].
pub fn reload() -> Result<TesseraConfig, ConfigError> {
    let path = get_config_path().ok_or(ConfigError::NotFound)?;
    load_config_from_path(path).map(|(config, _)| config)
}
