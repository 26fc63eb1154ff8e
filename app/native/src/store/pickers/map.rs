//! Queries across the monitor, window and workspace relations.

use std::sync::Arc;

use crate::geometry::wrap_index;
use crate::model::{Monitor, Workspace, WorkspaceId};
use crate::native::{MonitorHandle, WindowHandle};
use crate::store::error::{StoreError, StoreResult};
use crate::store::pickers::workspace::by_id;
use crate::store::sectors::RootSector;

/// Visible workspaces, in monitor order.
#[must_use]
pub fn all_active_workspaces(root: &RootSector) -> Vec<Arc<Workspace>> {
    root.monitors
        .monitors()
        .iter()
        .filter_map(|monitor| root.maps.workspace_for_monitor(monitor.handle))
        .filter_map(|id| root.workspaces.get(id).cloned())
        .collect()
}

pub fn workspace_by_monitor(monitor: MonitorHandle) -> impl Fn(&RootSector) -> StoreResult<Arc<Workspace>> {
    move |root| {
        let id = root.maps.workspace_for_monitor(monitor).ok_or(StoreError::MonitorNotFound(monitor))?;
        by_id(root, id)
    }
}

pub fn workspace_by_window(window: WindowHandle) -> impl Fn(&RootSector) -> StoreResult<Arc<Workspace>> {
    move |root| {
        let id = root.maps.workspace_for_window(window).ok_or(StoreError::WindowNotFound(window))?;
        by_id(root, id)
    }
}

/// The monitor showing a workspace. Hidden workspaces have none.
pub fn monitor_by_workspace(id: WorkspaceId) -> impl Fn(&RootSector) -> StoreResult<Monitor> {
    move |root| {
        root.maps
            .monitor_for_workspace(id)
            .and_then(|handle| root.monitors.get(handle).cloned())
            .ok_or(StoreError::WorkspaceNotFound(id))
    }
}

pub fn monitor_by_window(window: WindowHandle) -> impl Fn(&RootSector) -> StoreResult<Monitor> {
    move |root| {
        let id = root.maps.workspace_for_window(window).ok_or(StoreError::WindowNotFound(window))?;
        monitor_by_workspace(id)(root)
    }
}

/// The next (or previous) workspace in creation order, wrapping around.
///
/// With `skip_active`, workspaces visible on any monitor are passed over.
pub fn adjacent_workspace(
    id: WorkspaceId,
    reverse: bool,
    skip_active: bool,
) -> impl Fn(&RootSector) -> StoreResult<Arc<Workspace>> {
    move |root| {
        let order = root.workspaces.order();
        let start = order.iter().position(|other| *other == id).ok_or(StoreError::WorkspaceNotFound(id))?;
        let delta: isize = if reverse { -1 } else { 1 };

        #[allow(clippy::cast_possible_wrap)]
        let mut next = wrap_index(start as isize + delta, order.len());
        while next != start {
            let candidate = order[next];
            if !skip_active || !root.maps.is_active(candidate) {
                return by_id(root, candidate);
            }
            #[allow(clippy::cast_possible_wrap)]
            {
                next = wrap_index(next as isize + delta, order.len());
            }
        }

        Err(StoreError::NoAdjacent("workspace"))
    }
}
