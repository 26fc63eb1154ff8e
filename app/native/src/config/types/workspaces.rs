//! Workspace and window rule configuration types.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::layout::LayoutEngineKind;

/// Window matching rule, used by filters and routes.
///
/// All specified properties must match (AND logic).
/// At least one property must be specified.
///
/// Call [`WindowRule::prepare()`] after loading to compile the title pattern and
/// pre-compute lowercase names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowRule {
    /// Match by executable file name (e.g., "firefox.exe"), case-insensitive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_file_name: Option<String>,

    /// Match by window class name (e.g., "Chrome_WidgetWin_1"), exact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    /// Match by window title, as a regular expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip)]
    #[schemars(skip)]
    pub(crate) process_file_name_lower: Option<String>,

    #[serde(skip)]
    #[schemars(skip)]
    pub(crate) title_regex: Option<Regex>,
}

impl WindowRule {
    /// A rule matching one executable.
    #[must_use]
    pub fn process(file_name: &str) -> Self {
        let mut rule = Self { process_file_name: Some(file_name.to_string()), ..Self::default() };
        rule.process_file_name_lower = Some(file_name.to_ascii_lowercase());
        rule
    }

    /// A rule matching one window class.
    #[must_use]
    pub fn class(class_name: &str) -> Self {
        Self { class_name: Some(class_name.to_string()), ..Self::default() }
    }

    /// Returns true if the rule has at least one matching criterion.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.process_file_name.is_some() || self.class_name.is_some() || self.title.is_some()
    }

    /// Compiles the title pattern and lowercases the process name.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the title pattern does not compile.
    pub fn prepare(&mut self) -> Result<(), regex::Error> {
        self.process_file_name_lower = self.process_file_name.as_ref().map(|s| s.to_ascii_lowercase());
        self.title_regex = self.title.as_deref().map(Regex::new).transpose()?;
        Ok(())
    }

    /// Returns the cached lowercase process name, or the original if not cached.
    #[must_use]
    pub fn process_file_name_lowercase(&self) -> Option<&str> {
        self.process_file_name_lower.as_deref().or(self.process_file_name.as_deref())
    }

    #[must_use]
    pub const fn title_regex(&self) -> Option<&Regex> { self.title_regex.as_ref() }
}

/// Workspace configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Unique name for the workspace.
    pub name: String,

    /// Layout engines for this workspace.
    /// If not specified, uses the top-level `layoutEngines`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_engines: Option<Vec<LayoutEngineKind>>,
}

/// Sends windows matching `rule` to the named workspace.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    #[serde(flatten)]
    pub rule: WindowRule,

    /// Name of the target workspace.
    pub workspace: String,
}
