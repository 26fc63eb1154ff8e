//! Keybinding configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Commands bound to a key chord.
///
/// Can be either a single command id or an array of command ids that run in order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum KeybindingCommands {
    /// A single command to execute.
    Single(String),
    /// Multiple commands to execute sequentially.
    Multiple(Vec<String>),
}

impl KeybindingCommands {
    /// Returns all command ids to execute.
    ///
    /// Empty strings are filtered out. A chord bound to nothing lets the key through.
    #[must_use]
    pub fn get_commands(&self) -> Vec<&str> {
        match self {
            Self::Single(cmd) => {
                let trimmed = cmd.trim();
                if trimmed.is_empty() { vec![] } else { vec![trimmed] }
            }
            Self::Multiple(cmds) => cmds.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect(),
        }
    }

    /// Returns a display string for the command(s) for logging purposes.
    #[must_use]
    pub fn commands_display(&self) -> String {
        match self {
            Self::Single(cmd) => cmd.clone(),
            Self::Multiple(cmds) => cmds.join(", "),
        }
    }
}

/// What happens when a keybinding command panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum UncaughtErrorPolicy {
    /// Log the panic and keep running.
    #[default]
    Log,
    /// Log the panic and shut down.
    Shutdown,
}
