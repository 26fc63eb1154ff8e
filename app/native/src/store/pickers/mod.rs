//! Pure queries over a snapshot.
//!
//! A picker is any `FnOnce(&RootSector) -> T`. Queries without arguments are plain
//! functions; queries with arguments return a closure:
//!
//! ```rust,ignore
//! let monitor = store.pick(pickers::active_monitor)?;
//! let workspace = store.pick(pickers::workspace_by_window(handle))?;
//! ```

pub mod map;
pub mod monitor;
pub mod window;
pub mod workspace;

pub use map::*;
pub use monitor::*;
pub use window::*;
pub use workspace::{
    active_layout_engine, active_workspace, all_workspaces, last_focused_window, window_position,
    workspace_by_id, workspace_by_name, workspace_windows,
};
