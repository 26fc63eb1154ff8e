//! State slices of the store.
//!
//! Each sector owns its state and its queue of pending events. Transforms reach a
//! sector only through its methods; fields stay private to the sector module.

pub mod map;
pub mod monitor;
pub mod window;
pub mod workspace;

pub use map::MapSector;
pub use monitor::MonitorSector;
pub use window::WindowSector;
pub use workspace::{EngineCreator, ProxyCreator, WorkspaceSector, WorkspaceToCreate};

use super::events::StoreEvent;

/// A snapshot of every sector.
///
/// Clones are cheap: monitors, workspaces and engines are shared behind `Arc`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RootSector {
    pub monitors: MonitorSector,
    pub windows: WindowSector,
    pub maps: MapSector,
    pub workspaces: WorkspaceSector,
}

impl RootSector {
    /// Drains every queued event, sector by sector: monitor, window, workspace, map.
    ///
    /// Workspace events precede map events, so a workspace is announced before it
    /// is first shown on a monitor.
    pub fn take_events(&mut self) -> Vec<StoreEvent> {
        let mut events: Vec<StoreEvent> = Vec::new();
        events.extend(self.monitors.take_events().into_iter().map(StoreEvent::from));
        events.extend(self.windows.take_events().into_iter().map(StoreEvent::from));
        events.extend(self.workspaces.take_events().into_iter().map(StoreEvent::from));
        events.extend(self.maps.take_events().into_iter().map(StoreEvent::from));
        events
    }
}
