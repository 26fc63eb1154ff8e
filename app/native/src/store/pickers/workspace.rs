//! Workspace queries.

use std::sync::Arc;

use crate::layout::EngineRef;
use crate::model::{Window, Workspace, WorkspaceId};
use crate::native::{WindowHandle, WindowPosition};
use crate::store::error::{StoreError, StoreResult};
use crate::store::sectors::RootSector;

pub(crate) fn by_id(root: &RootSector, id: WorkspaceId) -> StoreResult<Arc<Workspace>> {
    root.workspaces.get(id).cloned().ok_or(StoreError::WorkspaceNotFound(id))
}

/// Resolves `None` to the active workspace.
pub(crate) fn or_active(root: &RootSector, id: Option<WorkspaceId>) -> StoreResult<Arc<Workspace>> {
    match id {
        Some(id) => by_id(root, id),
        None => active_workspace(root),
    }
}

pub fn workspace_by_id(id: WorkspaceId) -> impl Fn(&RootSector) -> StoreResult<Arc<Workspace>> {
    move |root| by_id(root, id)
}

pub fn workspace_by_name(name: &str) -> impl Fn(&RootSector) -> StoreResult<Arc<Workspace>> + '_ {
    move |root| root.workspaces.by_name(name).cloned().ok_or_else(|| StoreError::WorkspaceNameNotFound(name.to_string()))
}

/// Every workspace, in creation order.
#[must_use]
pub fn all_workspaces(root: &RootSector) -> Vec<Arc<Workspace>> { root.workspaces.iter().cloned().collect() }

/// The workspace shown on the active monitor.
///
/// # Errors
///
/// Fails before workspaces are initialized.
pub fn active_workspace(root: &RootSector) -> StoreResult<Arc<Workspace>> {
    let monitor = root.monitors.active_handle();
    let id = root.maps.workspace_for_monitor(monitor).ok_or(StoreError::MonitorNotFound(monitor))?;
    by_id(root, id)
}

/// The active layout engine of a workspace, `None` meaning the active workspace.
pub fn active_layout_engine(id: Option<WorkspaceId>) -> impl Fn(&RootSector) -> StoreResult<EngineRef> {
    move |root| or_active(root, id).map(|ws| Arc::clone(ws.active_engine()))
}

/// The tracked windows of a workspace, in workspace order.
pub fn workspace_windows(id: WorkspaceId) -> impl Fn(&RootSector) -> StoreResult<Vec<Window>> {
    move |root| {
        let workspace = by_id(root, id)?;
        Ok(workspace.windows().iter().filter_map(|handle| root.windows.get(*handle).cloned()).collect())
    }
}

/// The last focused window of a workspace, `None` meaning the active workspace.
pub fn last_focused_window(id: Option<WorkspaceId>) -> impl Fn(&RootSector) -> StoreResult<WindowHandle> {
    move |root| or_active(root, id)?.last_focused_window().ok_or(StoreError::NoValidWindow)
}

/// Where the last layout pass put `window`.
pub fn window_position(
    id: WorkspaceId,
    window: WindowHandle,
) -> impl Fn(&RootSector) -> StoreResult<WindowPosition> {
    move |root| {
        by_id(root, id)?;
        root.workspaces
            .window_position(id, window)
            .copied()
            .ok_or(StoreError::WindowNotInWorkspace { window, workspace: id })
    }
}
