//! Domain events queued by transforms and flushed after each dispatch.
//!
//! Events are grouped by the sector that queued them. A flush drains the sectors in
//! a fixed order: monitor, window, map, workspace.

use serde::Serialize;

use crate::geometry::Point;
use crate::model::{MonitorDiff, Window, WorkspaceId};
use crate::native::{MonitorHandle, WindowHandle};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MonitorEvent {
    MonitorsChanged(MonitorDiff),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WindowEvent {
    WindowAdded { window: Window },
    WindowRemoved { window: Window },
    /// `None` when focus moved to a window the manager does not track.
    WindowFocused { window: Option<WindowHandle> },
    WindowMoveStarted { window: WindowHandle, cursor: Option<Point> },
    WindowMoved { window: WindowHandle, cursor: Option<Point> },
    WindowMoveEnded { window: WindowHandle, cursor: Option<Point> },
    WindowMinimizeStarted { window: WindowHandle },
    WindowMinimizeEnded { window: WindowHandle },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MapEvent {
    MonitorWorkspaceChanged {
        monitor: MonitorHandle,
        previous: Option<WorkspaceId>,
        current: WorkspaceId,
    },
    /// The workspace on a monitor moved elsewhere and left the monitor empty.
    MonitorWorkspaceCleared { monitor: MonitorHandle, previous: WorkspaceId },
    /// A window entered, left or changed workspace.
    WindowRouted {
        window: WindowHandle,
        previous: Option<WorkspaceId>,
        current: Option<WorkspaceId>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkspaceEvent {
    WorkspaceAdded { id: WorkspaceId, name: String },
    WorkspaceRemoved { id: WorkspaceId, name: String },
    WorkspaceRenamed { id: WorkspaceId, previous: String, current: String },
    ActiveLayoutEngineChanged { id: WorkspaceId, previous: String, current: String },
    WorkspaceLayoutStarted { id: WorkspaceId },
    WorkspaceLayoutCompleted { id: WorkspaceId },
}

/// Any event delivered to store subscribers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoreEvent {
    Monitor(MonitorEvent),
    Window(WindowEvent),
    Map(MapEvent),
    Workspace(WorkspaceEvent),
}

impl From<MonitorEvent> for StoreEvent {
    fn from(event: MonitorEvent) -> Self { Self::Monitor(event) }
}

impl From<WindowEvent> for StoreEvent {
    fn from(event: WindowEvent) -> Self { Self::Window(event) }
}

impl From<MapEvent> for StoreEvent {
    fn from(event: MapEvent) -> Self { Self::Map(event) }
}

impl From<WorkspaceEvent> for StoreEvent {
    fn from(event: WorkspaceEvent) -> Self { Self::Workspace(event) }
}
