//! Logging configuration types.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Log output settings. The `TESSERA_LOG` environment variable overrides `level`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    /// A `tracing` filter directive, e.g. `info` or `tessera_lib::store=debug`.
    /// Default: "info"
    pub level: String,

    /// Write logs to this file instead of stderr. `~` and environment variables
    /// are expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl LoggingConfig {
    /// The expanded log file path, if file logging is configured.
    #[must_use]
    pub fn file_path(&self) -> Option<PathBuf> { self.file.as_deref().map(crate::platform::path::expand) }
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string(), file: None } }
}
