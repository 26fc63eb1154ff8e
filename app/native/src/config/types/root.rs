//! Root configuration type and loading.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::keybindings::{KeybindingCommands, UncaughtErrorPolicy};
use super::layout::{BarConfig, GapsConfig, LayoutEngineKind, MasterConfig, default_layout_engines};
use super::logging::LoggingConfig;
use super::routing::{ProcessorsConfig, RouterOptions};
use super::workspaces::{RouteRule, WindowRule, WorkspaceConfig};
use crate::platform::path::expand;

/// Root configuration for Tessera.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TesseraConfig {
    /// Workspaces to create at startup, in order. More are added when there are
    /// more monitors than workspaces.
    pub workspaces: Vec<WorkspaceConfig>,

    /// Layout engines every workspace cycles through, unless it lists its own.
    pub layout_engines: Vec<LayoutEngineKind>,

    /// Master layout settings.
    pub master: MasterConfig,

    pub gaps: GapsConfig,

    pub bar: BarConfig,

    /// Key chords mapped to command ids.
    ///
    /// ```json
    /// "keybindings": {
    ///     "win+alt+h": "tessera.core.focus_window_in_direction.left",
    ///     "win+alt+1": ["tessera.core.activate_workspace.1"]
    /// }
    /// ```
    pub keybindings: HashMap<String, KeybindingCommands>,

    /// Treat left and right modifier keys as the same key.
    /// Default: true
    pub unify_key_modifiers: bool,

    /// Windows that are never managed. Added to the built-in ignore list.
    pub filters: Vec<WindowRule>,

    /// Rules sending new windows to a named workspace, checked in order.
    pub routes: Vec<RouteRule>,

    pub router_options: RouterOptions,

    pub processors: ProcessorsConfig,

    pub uncaught_error_policy: UncaughtErrorPolicy,

    pub logging: LoggingConfig,

    /// Directory of the state file written on shutdown. `~` and environment
    /// variables are expanded. Defaults to the local data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_state_dir: Option<String>,
}

impl Default for TesseraConfig {
    fn default() -> Self {
        Self {
            workspaces: Vec::new(),
            layout_engines: default_layout_engines(),
            master: MasterConfig::default(),
            gaps: GapsConfig::default(),
            bar: BarConfig::default(),
            keybindings: HashMap::new(),
            unify_key_modifiers: true,
            filters: Vec::new(),
            routes: Vec::new(),
            router_options: RouterOptions::default(),
            processors: ProcessorsConfig::default(),
            uncaught_error_policy: UncaughtErrorPolicy::default(),
            logging: LoggingConfig::default(),
            saved_state_dir: None,
        }
    }
}

impl TesseraConfig {
    /// Parses a JSONC document and prepares its rules.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for invalid JSON and `ConfigError::InvalidRule`
    /// for a title pattern that does not compile.
    pub fn from_jsonc(source: &str) -> Result<Self, ConfigError> {
        let reader = json_comments::StripComments::new(source.as_bytes());
        let mut config: Self = serde_json::from_reader(reader)?;
        config.prepare()?;
        Ok(config)
    }

    /// Compiles rule patterns and checks the document for mistakes serde cannot see.
    ///
    /// # Errors
    ///
    /// Returns the first invalid rule or setting found.
    pub fn prepare(&mut self) -> Result<(), ConfigError> {
        if self.layout_engines.is_empty() {
            return Err(ConfigError::Invalid("layoutEngines must list at least one engine".to_string()));
        }

        if let Some(ws) = self.workspaces.iter().find(|ws| ws.layout_engines.as_ref().is_some_and(Vec::is_empty)) {
            return Err(ConfigError::Invalid(format!("workspace {:?} lists no layout engines", ws.name)));
        }

        let rules = self.filters.iter_mut().chain(self.routes.iter_mut().map(|route| &mut route.rule));
        for rule in rules {
            if !rule.is_valid() {
                return Err(ConfigError::Invalid("a window rule must set at least one property".to_string()));
            }
            rule.prepare().map_err(|err| ConfigError::InvalidRule(err.to_string()))?;
        }

        Ok(())
    }

    /// Path of the state file written on shutdown.
    #[must_use]
    pub fn saved_state_path(&self) -> PathBuf {
        let dir = self.saved_state_dir.as_deref().map_or_else(default_state_dir, expand);
        dir.join(SAVED_STATE_FILE_NAME)
    }
}

const SAVED_STATE_FILE_NAME: &str = "saved_state.json";

fn default_state_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(std::env::temp_dir).join("tessera")
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error("No configuration file found. Expected at ~/.config/tessera/config.jsonc or config.json")]
    NotFound,

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A title pattern did not compile.
    #[error("Invalid window rule: {0}")]
    InvalidRule(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/tessera/`, if set
/// 2. `~/.config/tessera/`
/// 3. the platform config directory (`%APPDATA%\tessera\` on Windows)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let dir = PathBuf::from(xdg_config).join("tessera");
        for filename in CONFIG_FILE_NAMES {
            paths.push(dir.join(filename));
        }
    }

    let dirs = [
        dirs::home_dir().map(|home| home.join(".config").join("tessera")),
        dirs::config_dir().map(|config| config.join("tessera")),
    ];
    for dir in dirs.into_iter().flatten() {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            // XDG_CONFIG_HOME might be ~/.config
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    paths
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected
/// locations, or the error of [`load_config_from_path`] for the file found.
pub fn load_config() -> Result<(TesseraConfig, PathBuf), ConfigError> {
    let path = config_paths().into_iter().find(|path| path.exists()).ok_or(ConfigError::NotFound)?;
    load_config_from_path(&path)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, `ConfigError::Io` if it
/// cannot be read, and a parse or validation error if its content is invalid.
pub fn load_config_from_path(path: &Path) -> Result<(TesseraConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let source = fs::read_to_string(path)?;
    let config = TesseraConfig::from_jsonc(&source)?;
    Ok((config, path.to_path_buf()))
}
