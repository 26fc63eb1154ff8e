//! Moving windows and workspaces between monitors.
//!
//! These transforms back the butler. Each resolves the current mappings, updates
//! the map sector, queues layout for every affected visible workspace and queues
//! one map event per changed association.

use tracing::debug;

use super::{
    AddWindowToWorkspace, DeactivateWorkspace, FocusLastFocusedWindow, RemoveWindowFromWorkspace, Transform,
    window_or_focused, workspace, workspace_of, workspace_or_active,
};
use crate::geometry::Point;
use crate::model::WorkspaceId;
use crate::native::{MonitorHandle, WindowHandle};
use crate::store::error::{StoreError, StoreResult};
use crate::store::events::MapEvent;
use crate::store::pickers;
use crate::store::TransformContext;

/// Shows `id` on `monitor` without touching focus or the workspace it replaces.
pub(super) fn show_workspace(ctx: &mut TransformContext<'_>, monitor: MonitorHandle, id: WorkspaceId) {
    let previous = ctx.root.maps.set_monitor_workspace(monitor, id);
    if previous == Some(id) {
        return;
    }
    debug!(%monitor, workspace = %id, "showing workspace");
    ctx.root.workspaces.queue_layout(id);
    ctx.root.maps.queue(MapEvent::MonitorWorkspaceChanged { monitor, previous, current: id });
}

/// Moves a window between workspaces, hiding it when the target is not shown.
fn relocate(ctx: &mut TransformContext<'_>, window: WindowHandle, from: WorkspaceId, to: WorkspaceId) -> StoreResult<()> {
    ctx.dispatch(RemoveWindowFromWorkspace { workspace: from, window })?;
    ctx.dispatch(AddWindowToWorkspace::new(to, window))?;
    if !ctx.root.maps.is_active(to) {
        ctx.native.hide_window(window);
    }
    ctx.root.maps.queue(MapEvent::WindowRouted { window, previous: Some(from), current: Some(to) });
    Ok(())
}

/// Shows a workspace on a monitor.
///
/// The workspace previously on that monitor is hidden, or, when the activated
/// workspace was visible elsewhere, swapped onto the monitor it came from.
#[derive(Clone, Copy, Debug)]
pub struct ActivateWorkspace {
    pub workspace: WorkspaceId,
    /// `None` means the monitor the workspace was last shown on, else the active one.
    pub monitor: Option<MonitorHandle>,
    /// Focus the workspace's last focused window afterwards.
    pub focus: bool,
}

impl ActivateWorkspace {
    #[must_use]
    pub const fn new(workspace: WorkspaceId) -> Self { Self { workspace, monitor: None, focus: true } }

    #[must_use]
    pub const fn on(workspace: WorkspaceId, monitor: MonitorHandle) -> Self {
        Self { workspace, monitor: Some(monitor), focus: true }
    }
}

impl Transform for ActivateWorkspace {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let target = workspace(ctx, self.workspace)?;
        let monitor = match self.monitor {
            Some(monitor) => monitor,
            None => ctx
                .root
                .maps
                .last_monitor_for_workspace(target.id)
                .filter(|monitor| ctx.root.monitors.get(*monitor).is_some())
                .unwrap_or_else(|| ctx.root.monitors.active_handle()),
        };
        if ctx.root.monitors.get(monitor).is_none() {
            return Err(StoreError::MonitorNotFound(monitor));
        }

        let loser_monitor = ctx.root.maps.monitor_for_workspace(target.id);
        if loser_monitor != Some(monitor) {
            let old = ctx.root.maps.set_monitor_workspace(monitor, target.id);
            match (loser_monitor, old) {
                (Some(other), Some(old)) => {
                    debug!(workspace = %old, monitor = %other, "swapping workspace onto the other monitor");
                    ctx.root.maps.set_monitor_workspace(other, old);
                    ctx.root.workspaces.queue_layout(old);
                    ctx.root.maps.queue(MapEvent::MonitorWorkspaceChanged {
                        monitor: other,
                        previous: Some(target.id),
                        current: old,
                    });
                }
                (Some(other), None) => {
                    debug!(workspace = %target, monitor = %other, "leaving monitor without a workspace");
                    ctx.root.maps.unset_monitor(other);
                    ctx.native.focus_monitor_desktop(other);
                    ctx.root.maps.queue(MapEvent::MonitorWorkspaceCleared { monitor: other, previous: target.id });
                }
                (None, Some(old)) => ctx.dispatch(DeactivateWorkspace { workspace: old })?,
                (None, None) => {}
            }

            debug!(workspace = %target, %monitor, "activated workspace");
            ctx.root.workspaces.queue_layout(target.id);
            ctx.root.maps.queue(MapEvent::MonitorWorkspaceChanged { monitor, previous: old, current: target.id });
        }

        ctx.root.monitors.set_active(monitor);
        if self.focus {
            ctx.dispatch(FocusLastFocusedWindow { workspace: Some(target.id) })?;
        }
        Ok(())
    }
}

/// Moves a window to a workspace. The window follows focus when the workspace is
/// shown.
#[derive(Clone, Copy, Debug)]
pub struct MoveWindowToWorkspace {
    pub workspace: WorkspaceId,
    /// `None` means the last focused window of the active workspace.
    pub window: Option<WindowHandle>,
}

impl Transform for MoveWindowToWorkspace {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let window = window_or_focused(ctx, self.window)?;
        let source = workspace_of(ctx, window)?;
        workspace(ctx, self.workspace)?;
        if source.id == self.workspace {
            return Ok(());
        }

        relocate(ctx, window, source.id, self.workspace)?;
        if ctx.root.maps.is_active(self.workspace) {
            ctx.root.workspaces.set_window_to_focus(Some(window));
        }
        Ok(())
    }
}

/// Moves a window to the workspace shown on a monitor.
#[derive(Clone, Copy, Debug)]
pub struct MoveWindowToMonitor {
    pub monitor: MonitorHandle,
    pub window: Option<WindowHandle>,
}

impl Transform for MoveWindowToMonitor {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let window = window_or_focused(ctx, self.window)?;
        let target = ctx.root.maps.workspace_for_monitor(self.monitor).ok_or(StoreError::MonitorNotFound(self.monitor))?;
        ctx.dispatch(MoveWindowToWorkspace { workspace: target, window: Some(window) })
    }
}

/// Moves a window to the next (or previous) monitor.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveWindowToAdjacentMonitor {
    pub window: Option<WindowHandle>,
    pub reverse: bool,
}

impl Transform for MoveWindowToAdjacentMonitor {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let window = window_or_focused(ctx, self.window)?;
        let current = ctx.pick(pickers::monitor_by_window(window))?;
        let next = ctx.pick(pickers::adjacent_monitor(Some(current.handle), self.reverse))?;
        if next.handle == current.handle {
            return Err(StoreError::NoAdjacent("monitor"));
        }
        ctx.dispatch(MoveWindowToMonitor { monitor: next.handle, window: Some(window) })
    }
}

/// Moves a window to a screen point, possibly on another monitor.
///
/// The point is normalized against the working area of the monitor under it, and
/// the workspace shown there decides where the window lands.
#[derive(Clone, Copy, Debug)]
pub struct MoveWindowToPoint {
    pub window: Option<WindowHandle>,
    pub point: Point,
}

impl Transform for MoveWindowToPoint {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let window = window_or_focused(ctx, self.window)?;
        if !ctx.root.windows.contains(window) {
            return Err(StoreError::WindowNotFound(window));
        }

        let monitor = ctx.pick(pickers::monitor_at_point(self.point))?;
        let target =
            ctx.root.maps.workspace_for_monitor(monitor.handle).ok_or(StoreError::MonitorNotFound(monitor.handle))?;
        let area = monitor.working_area;
        let unit = area.point_to_unit_square(area.to_local(self.point), false);

        match ctx.root.maps.workspace_for_window(window) {
            Some(source) if source == target => {
                let current = workspace(ctx, target)?;
                if let Some(updated) = current.with_all_engines(|engine| engine.move_window_to_point(window, unit)) {
                    ctx.root.workspaces.replace(updated);
                }
                ctx.root.workspaces.queue_layout(target);
            }
            source => {
                if let Some(source) = source {
                    ctx.dispatch(RemoveWindowFromWorkspace { workspace: source, window })?;
                }
                ctx.dispatch(AddWindowToWorkspace { workspace: target, window, point: Some(unit) })?;
                ctx.root.maps.queue(MapEvent::WindowRouted { window, previous: source, current: Some(target) });
            }
        }

        ctx.root.monitors.set_active(monitor.handle);
        ctx.root.workspaces.set_window_to_focus(Some(window));
        Ok(())
    }
}

/// Moves a workspace to the next (or previous) monitor, swapping it with the
/// workspace shown there.
#[derive(Clone, Copy, Debug, Default)]
pub struct SwapWorkspaceWithAdjacentMonitor {
    pub workspace: Option<WorkspaceId>,
    pub reverse: bool,
}

impl Transform for SwapWorkspaceWithAdjacentMonitor {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let current = workspace_or_active(ctx, self.workspace)?;
        let monitor = ctx.pick(pickers::monitor_by_workspace(current.id))?;
        let next = ctx.pick(pickers::adjacent_monitor(Some(monitor.handle), self.reverse))?;
        if next.handle == monitor.handle {
            return Err(StoreError::NoAdjacent("monitor"));
        }
        ctx.dispatch(ActivateWorkspace::on(current.id, next.handle))
    }
}

/// Moves every window of `source` into `target`.
#[derive(Clone, Copy, Debug)]
pub struct MergeWorkspaceWindows {
    pub source: WorkspaceId,
    pub target: WorkspaceId,
}

impl Transform for MergeWorkspaceWindows {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let source = workspace(ctx, self.source)?;
        workspace(ctx, self.target)?;
        if self.source == self.target {
            return Ok(());
        }

        debug!(from = %source, to = %self.target, windows = source.windows().len(), "merging workspaces");
        for window in source.windows() {
            relocate(ctx, *window, self.source, self.target)?;
        }
        Ok(())
    }
}

/// Shows the next (or previous) workspace on a monitor.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActivateAdjacentWorkspace {
    /// `None` means the active monitor.
    pub monitor: Option<MonitorHandle>,
    pub reverse: bool,
    /// Pass over workspaces shown on other monitors.
    pub skip_active: bool,
}

impl Transform for ActivateAdjacentWorkspace {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let monitor = self.monitor.unwrap_or_else(|| ctx.root.monitors.active_handle());
        let current = ctx.pick(pickers::workspace_by_monitor(monitor))?;
        let next = ctx.pick(pickers::adjacent_workspace(current.id, self.reverse, self.skip_active))?;
        ctx.dispatch(ActivateWorkspace::on(next.id, monitor))
    }
}

/// Moves a window to the next (or previous) workspace.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveWindowToAdjacentWorkspace {
    pub window: Option<WindowHandle>,
    pub reverse: bool,
    pub skip_active: bool,
}

impl Transform for MoveWindowToAdjacentWorkspace {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let window = window_or_focused(ctx, self.window)?;
        let current = workspace_of(ctx, window)?;
        let next = ctx.pick(pickers::adjacent_workspace(current.id, self.reverse, self.skip_active))?;
        ctx.dispatch(MoveWindowToWorkspace { workspace: next.id, window: Some(window) })
    }
}
