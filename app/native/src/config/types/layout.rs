//! Layout engine configuration types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use crate::layout::master::MasterPosition;

/// A leaf layout engine a workspace can cycle through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum LayoutEngineKind {
    /// Equal-width columns, left to right.
    Column,
    /// Equal-width columns, right to left.
    ColumnRightToLeft,
    /// One window shown at a time, the rest minimized.
    Focus,
    /// A master area plus a stack.
    Master,
    /// Windows split the most recently added one, to the right until changed with
    /// the `Tree.add_node_direction` action.
    Tree,
}

impl LayoutEngineKind {
    /// The name used in the configuration file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::ColumnRightToLeft => "columnRightToLeft",
            Self::Focus => "focus",
            Self::Master => "master",
            Self::Tree => "tree",
        }
    }
}

/// Default engine list: every built-in engine.
#[must_use]
pub fn default_layout_engines() -> Vec<LayoutEngineKind> {
    vec![
        LayoutEngineKind::Column,
        LayoutEngineKind::ColumnRightToLeft,
        LayoutEngineKind::Focus,
        LayoutEngineKind::Master,
    ]
}

/// Master layout settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MasterConfig {
    /// Share of the monitor given to the master window, between 0.1 and 0.9.
    /// Default: 0.5
    pub ratio: f64,

    /// Where the master area sits. `auto` picks left for landscape monitors and top
    /// for portrait ones.
    pub position: MasterPosition,
}

impl Default for MasterConfig {
    fn default() -> Self { Self { ratio: 0.5, position: MasterPosition::Auto } }
}

/// Gaps between windows and around the monitor edges, in pixels.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GapsConfig {
    pub outer: u32,
    pub inner: u32,
}

impl GapsConfig {
    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.outer > 0 || self.inner > 0 }
}

/// Space reserved at the top of every monitor for an external status bar.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BarConfig {
    /// Height of the reserved strip in pixels. Zero disables the reservation.
    pub height: u32,
}

impl BarConfig {
    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.height > 0 }
}
