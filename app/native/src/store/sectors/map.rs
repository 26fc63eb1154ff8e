//! Map sector: which workspace each monitor shows and each window belongs to.

use std::collections::BTreeMap;

use crate::model::WorkspaceId;
use crate::native::{MonitorHandle, WindowHandle};
use crate::store::events::MapEvent;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapSector {
    monitor_workspace: BTreeMap<MonitorHandle, WorkspaceId>,
    window_workspace: BTreeMap<WindowHandle, WorkspaceId>,
    /// The monitor each workspace was last shown on, kept after it is hidden.
    workspace_last_monitor: BTreeMap<WorkspaceId, MonitorHandle>,
    events: Vec<MapEvent>,
}

impl MapSector {
    #[must_use]
    pub fn workspace_for_monitor(&self, monitor: MonitorHandle) -> Option<WorkspaceId> {
        self.monitor_workspace.get(&monitor).copied()
    }

    #[must_use]
    pub fn monitor_for_workspace(&self, workspace: WorkspaceId) -> Option<MonitorHandle> {
        self.monitor_workspace.iter().find(|(_, id)| **id == workspace).map(|(monitor, _)| *monitor)
    }

    #[must_use]
    pub fn workspace_for_window(&self, window: WindowHandle) -> Option<WorkspaceId> {
        self.window_workspace.get(&window).copied()
    }

    #[must_use]
    pub fn last_monitor_for_workspace(&self, workspace: WorkspaceId) -> Option<MonitorHandle> {
        self.workspace_last_monitor.get(&workspace).copied()
    }

    #[must_use]
    pub fn is_active(&self, workspace: WorkspaceId) -> bool { self.monitor_for_workspace(workspace).is_some() }

    /// `(monitor, workspace)` pairs for every visible workspace.
    pub fn active(&self) -> impl Iterator<Item = (MonitorHandle, WorkspaceId)> + '_ {
        self.monitor_workspace.iter().map(|(monitor, id)| (*monitor, *id))
    }

    /// Windows mapped to `workspace`, in handle order.
    pub fn windows_in(&self, workspace: WorkspaceId) -> impl Iterator<Item = WindowHandle> + '_ {
        self.window_workspace.iter().filter(move |(_, id)| **id == workspace).map(|(window, _)| *window)
    }

    /// Shows `workspace` on `monitor` and records it as the workspace's last monitor.
    pub fn set_monitor_workspace(&mut self, monitor: MonitorHandle, workspace: WorkspaceId) -> Option<WorkspaceId> {
        self.workspace_last_monitor.insert(workspace, monitor);
        self.monitor_workspace.insert(monitor, workspace)
    }

    pub fn unset_monitor(&mut self, monitor: MonitorHandle) -> Option<WorkspaceId> {
        self.monitor_workspace.remove(&monitor)
    }

    pub fn set_window_workspace(&mut self, window: WindowHandle, workspace: WorkspaceId) -> Option<WorkspaceId> {
        self.window_workspace.insert(window, workspace)
    }

    pub fn remove_window(&mut self, window: WindowHandle) -> Option<WorkspaceId> {
        self.window_workspace.remove(&window)
    }

    /// Drops every entry that refers to `workspace`.
    pub fn remove_workspace(&mut self, workspace: WorkspaceId) {
        self.monitor_workspace.retain(|_, id| *id != workspace);
        self.window_workspace.retain(|_, id| *id != workspace);
        self.workspace_last_monitor.remove(&workspace);
    }

    /// Reconciles the monitor keys with a new display topology in one pass.
    ///
    /// `removed` holds old handles that no longer exist and `reissued` holds
    /// `(old, new)` pairs for surviving monitors. Returns the workspaces that lost
    /// their monitor, in handle order.
    pub fn remap_monitors(
        &mut self,
        removed: &[MonitorHandle],
        reissued: &[(MonitorHandle, MonitorHandle)],
    ) -> Vec<WorkspaceId> {
        let translate = |monitor: MonitorHandle| {
            reissued.iter().find(|(old, _)| *old == monitor).map_or(monitor, |(_, new)| *new)
        };

        let mut orphaned = Vec::new();
        let mut remapped = BTreeMap::new();
        for (monitor, workspace) in std::mem::take(&mut self.monitor_workspace) {
            if removed.contains(&monitor) {
                orphaned.push(workspace);
            } else {
                remapped.insert(translate(monitor), workspace);
            }
        }
        self.monitor_workspace = remapped;

        for monitor in self.workspace_last_monitor.values_mut() {
            if !removed.contains(monitor) {
                *monitor = translate(*monitor);
            }
        }
        orphaned
    }

    pub fn queue(&mut self, event: MapEvent) { self.events.push(event); }

    pub fn take_events(&mut self) -> Vec<MapEvent> { std::mem::take(&mut self.events) }
}
