//! Configuration types for Tessera.
//!
//! This module provides all configuration types organized by domain.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod keybindings;
pub mod layout;
pub mod logging;
pub mod root;
pub mod routing;
pub mod workspaces;

// Keybinding types
pub use keybindings::{KeybindingCommands, UncaughtErrorPolicy};
// Layout types
pub use layout::{BarConfig, GapsConfig, LayoutEngineKind, MasterConfig, MasterPosition, default_layout_engines};
// Logging types
pub use logging::LoggingConfig;
// Root config types
pub use root::{ConfigError, TesseraConfig, config_paths, load_config, load_config_from_path};
// Routing types
pub use routing::{GraceWindowConfig, ProcessorsConfig, RouterOptions};
// Workspace types
pub use workspaces::{RouteRule, WindowRule, WorkspaceConfig};
