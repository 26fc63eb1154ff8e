//! Window routing configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where a new window goes when no route claims it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RouterOptions {
    /// The workspace of the monitor the window opened on.
    #[default]
    RouteToLaunchedWorkspace,
    /// The workspace shown on the active monitor.
    RouteToActiveWorkspace,
    /// The workspace shown on the last monitor where a tracked window had focus.
    RouteToLastTrackedActiveWorkspace,
}

/// A startup grace window for applications that reposition their own windows while
/// launching.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraceWindowConfig {
    /// Executable file names the grace window applies to.
    pub process_file_names: Vec<String>,

    /// How long events are held back after the first one, in milliseconds.
    /// Default: 3000
    #[serde(default = "default_grace_ms")]
    pub duration_ms: u64,
}

const fn default_grace_ms() -> u64 { 3000 }

/// Per-application event processors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessorsConfig {
    pub grace_windows: Vec<GraceWindowConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grace_window_default_duration() {
        let config: GraceWindowConfig =
            serde_json::from_str(r#"{ "processFileNames": ["teams.exe"] }"#).unwrap();
        assert_eq!(config.duration_ms, 3000);
    }

    #[test]
    fn test_router_options_names() {
        let options: RouterOptions = serde_json::from_str(r#""routeToActiveWorkspace""#).unwrap();
        assert_eq!(options, RouterOptions::RouteToActiveWorkspace);
        assert_eq!(RouterOptions::default(), RouterOptions::RouteToLaunchedWorkspace);
    }
}
