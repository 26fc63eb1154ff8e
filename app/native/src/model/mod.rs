//! Domain values held in the store: monitors, windows and workspaces.
//!
//! Relations between them live in the map sector, not on the values themselves:
//! - monitor → workspace (at most one active workspace per monitor)
//! - window → workspace (exactly one per tracked window)

pub mod monitor;
pub mod window;
pub mod workspace;

pub use monitor::{Monitor, MonitorDiff, sort_monitors};
pub use window::Window;
pub use workspace::{WindowList, Workspace, WorkspaceId};
