//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
///
/// This creates a JSONC file documenting every available configuration option.
#[must_use]
pub fn generate_config_template() -> String {
    r##"// Tessera Configuration File
// ===========================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.
// Keybindings are reloaded when this file is saved; other changes need a restart.

{
  // ============================================================================
  // Workspaces
  // ============================================================================
  // Created at startup, in order. More are added if there are more monitors.
  // "workspaces": [
  //   { "name": "web" },
  //   { "name": "code", "layoutEngines": ["master", "focus"] },
  //   { "name": "chat" }
  // ],

  // ============================================================================
  // Layout
  // ============================================================================
  // Engines every workspace cycles through: "column", "columnRightToLeft",
  // "focus", "master" and "tree"
  // "layoutEngines": ["column", "columnRightToLeft", "focus", "master"],
  //
  // "master": {
  //   // Share of the monitor given to the master window (0.1 - 0.9)
  //   "ratio": 0.5,
  //
  //   // "auto", "left", "right", "top" or "bottom"
  //   "position": "auto"
  // },
  //
  // // Pixels between windows (inner) and around the monitor edges (outer)
  // "gaps": { "outer": 0, "inner": 0 },
  //
  // // Pixels reserved at the top of every monitor for a status bar
  // "bar": { "height": 0 },

  // ============================================================================
  // Keybindings
  // ============================================================================
  // Chords map to one command id or a list run in order. Modifiers are Ctrl, Shift,
  // Alt and Win, with L/R variants (LCtrl, RAlt, ...).
  // "keybindings": {
  //   "Win+Alt+H": "tessera.core.focus_window_in_direction.left",
  //   "Win+Alt+L": "tessera.core.focus_window_in_direction.right",
  //   "Win+Alt+1": "tessera.core.activate_workspace_1",
  //   "Win+Alt+Shift+1": "tessera.core.move_window_to_workspace_1",
  //   "Win+Alt+Space": "tessera.core.cycle_layout_engine.next",
  //   "Win+Alt+Q": ["tessera.core.exit"]
  // },
  //
  // // Treat left and right modifiers as the same key
  // "unifyKeyModifiers": true,
  //
  // // When a command panics: "log" keeps running, "shutdown" exits
  // "uncaughtErrorPolicy": "log",

  // ============================================================================
  // Window Rules
  // ============================================================================
  // Windows never managed, on top of the built-in list. Every property set must
  // match; "title" is a regular expression.
  // "filters": [
  //   { "processFileName": "PowerToys.PowerLauncher.exe" },
  //   { "className": "TaskManagerWindow" }
  // ],
  //
  // // New windows matching a rule open on the named workspace
  // "routes": [
  //   { "processFileName": "firefox.exe", "workspace": "web" },
  //   { "title": "Visual Studio Code$", "workspace": "code" }
  // ],
  //
  // // Where unmatched windows go: "routeToLaunchedWorkspace",
  // // "routeToActiveWorkspace" or "routeToLastTrackedActiveWorkspace"
  // "routerOptions": "routeToLaunchedWorkspace",
  //
  // // Applications whose events are held back while they restore their windows
  // "processors": {
  //   "graceWindows": [
  //     { "processFileNames": ["ms-teams.exe"], "durationMs": 3000 }
  //   ]
  // },

  // ============================================================================
  // Logging and State
  // ============================================================================
  // // TESSERA_LOG overrides "level"
  // "logging": { "level": "info", "file": "~/tessera.log" },
  //
  // // Directory of the window positions saved on exit
  // "savedStateDir": "%LOCALAPPDATA%/tessera"
}
"##
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}
