//! Per-window operations that go through a workspace's layout engines.
//!
//! Membership changes (add, remove, minimize) are applied to every engine of the
//! workspace so switching engines keeps the same window set. Directional
//! operations only touch the active engine.

use std::sync::Arc;

use tracing::debug;

use super::{Transform, window_or_focused, workspace, workspace_of, workspace_or_active};
use crate::geometry::{Direction, Point};
use crate::layout::LayoutEngineCustomAction;
use crate::model::WorkspaceId;
use crate::native::WindowHandle;
use crate::store::error::{StoreError, StoreResult};
use crate::store::TransformContext;

/// Adds a window to a workspace and maps it there.
///
/// Minimized windows enter the engines minimized. With `point`, given in the unit
/// square of the workspace, the window is inserted at that point instead of appended.
#[derive(Clone, Copy, Debug)]
pub struct AddWindowToWorkspace {
    pub workspace: WorkspaceId,
    pub window: WindowHandle,
    pub point: Option<Point>,
}

impl AddWindowToWorkspace {
    #[must_use]
    pub const fn new(workspace: WorkspaceId, window: WindowHandle) -> Self { Self { workspace, window, point: None } }
}

impl Transform for AddWindowToWorkspace {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let current = workspace(ctx, self.workspace)?;
        let window = self.window;
        let minimized = ctx.root.windows.get(window).is_some_and(|w| w.is_minimized);

        let updated = current.with_window(window, |engine| match (minimized, self.point) {
            (true, _) => engine.minimize_window_start(window),
            (false, Some(point)) => engine.move_window_to_point(window, point),
            (false, None) => engine.add_window(window),
        });
        if let Some(updated) = updated {
            ctx.root.workspaces.replace(updated);
        }

        ctx.root.maps.set_window_workspace(window, self.workspace);
        ctx.root.workspaces.queue_layout(self.workspace);
        Ok(())
    }
}

/// Removes a window from a workspace and unmaps it.
#[derive(Clone, Copy, Debug)]
pub struct RemoveWindowFromWorkspace {
    pub workspace: WorkspaceId,
    pub window: WindowHandle,
}

impl Transform for RemoveWindowFromWorkspace {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let current = workspace(ctx, self.workspace)?;
        let updated = current
            .without_window(self.window)
            .ok_or(StoreError::WindowNotInWorkspace { window: self.window, workspace: self.workspace })?;

        ctx.root.workspaces.replace(updated);
        if ctx.root.maps.workspace_for_window(self.window) == Some(self.workspace) {
            ctx.root.maps.remove_window(self.window);
        }
        ctx.root.workspaces.queue_layout(self.workspace);
        Ok(())
    }
}

/// Moves focus from a window to its neighbour in the active engine.
///
/// Returns the window that will receive focus.
#[derive(Clone, Copy, Debug)]
pub struct FocusWindowInDirection {
    pub direction: Direction,
    /// `None` means the last focused window of the active workspace.
    pub window: Option<WindowHandle>,
}

impl Transform for FocusWindowInDirection {
    type Output = Option<WindowHandle>;

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<Option<WindowHandle>> {
        let window = window_or_focused(ctx, self.window)?;
        let current = workspace_of(ctx, window)?;

        let (engine, target) = Arc::clone(current.active_engine()).focus_window_in_direction(self.direction, window);
        if let Some(updated) = current.with_active_engine(|_| engine) {
            ctx.root.workspaces.replace(updated);
            ctx.root.workspaces.queue_layout(current.id);
        }

        if let Some(target) = target {
            debug!(from = %window, to = %target, direction = self.direction.as_str(), "focusing in direction");
            ctx.root.workspaces.set_window_to_focus(Some(target));
        }
        Ok(target)
    }
}

/// Swaps a window with its neighbour in the active engine.
#[derive(Clone, Copy, Debug)]
pub struct SwapWindowInDirection {
    pub direction: Direction,
    pub window: Option<WindowHandle>,
}

impl Transform for SwapWindowInDirection {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let window = window_or_focused(ctx, self.window)?;
        let current = workspace_of(ctx, window)?;

        if let Some(updated) = current.with_active_engine(|engine| engine.swap_window_in_direction(self.direction, window))
        {
            ctx.root.workspaces.replace(updated);
            ctx.root.workspaces.queue_layout(current.id);
        }
        Ok(())
    }
}

/// Moves one edge of a window by a pixel delta.
///
/// The delta is normalized against the working area of the monitor showing the
/// workspace before it reaches the engine.
#[derive(Clone, Copy, Debug)]
pub struct MoveWindowEdgesInDirection {
    pub edge: Direction,
    /// Pixels. Positive values move right or down.
    pub deltas: Point,
    pub window: Option<WindowHandle>,
}

impl Transform for MoveWindowEdgesInDirection {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let window = window_or_focused(ctx, self.window)?;
        let current = workspace_of(ctx, window)?;
        let monitor = ctx.pick(crate::store::pickers::monitor_by_workspace(current.id))?;
        let deltas = monitor.working_area.point_to_unit_square(self.deltas, true);

        if let Some(updated) =
            current.with_active_engine(|engine| engine.move_window_edges_in_direction(self.edge, deltas, window))
        {
            ctx.root.workspaces.replace(updated);
            ctx.root.workspaces.queue_layout(current.id);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MinimizeWindowStart {
    pub workspace: WorkspaceId,
    pub window: WindowHandle,
}

impl Transform for MinimizeWindowStart {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let current = workspace(ctx, self.workspace)?;
        if let Some(updated) = current.with_all_engines(|engine| engine.minimize_window_start(self.window)) {
            ctx.root.workspaces.replace(updated);
        }
        ctx.root.workspaces.queue_layout(self.workspace);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MinimizeWindowEnd {
    pub workspace: WorkspaceId,
    pub window: WindowHandle,
}

impl Transform for MinimizeWindowEnd {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let current = workspace(ctx, self.workspace)?;
        if let Some(updated) = current.with_all_engines(|engine| engine.minimize_window_end(self.window)) {
            ctx.root.workspaces.replace(updated);
        }
        ctx.root.workspaces.queue_layout(self.workspace);
        Ok(())
    }
}

/// Sends a custom action to every engine of a workspace.
///
/// Engines that do not own the action name pass it through unchanged.
#[derive(Clone, Debug)]
pub struct PerformCustomAction {
    pub workspace: Option<WorkspaceId>,
    pub action: LayoutEngineCustomAction,
}

impl Transform for PerformCustomAction {
    type Output = bool;

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<bool> {
        let current = workspace_or_active(ctx, self.workspace)?;
        let Some(updated) = current.with_all_engines(|engine| engine.perform_custom_action(&self.action)) else {
            debug!(action = %self.action.name, workspace = %current, "custom action changed nothing");
            return Ok(false);
        };

        ctx.root.workspaces.replace(updated);
        ctx.root.workspaces.queue_layout(current.id);
        Ok(true)
    }
}

/// Hides every window of a workspace that is no longer shown.
#[derive(Clone, Copy, Debug)]
pub struct DeactivateWorkspace {
    pub workspace: WorkspaceId,
}

impl Transform for DeactivateWorkspace {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let current = workspace(ctx, self.workspace)?;
        debug!(workspace = %current, windows = current.windows().len(), "deactivating workspace");
        for window in current.windows() {
            ctx.native.hide_window(*window);
        }
        Ok(())
    }
}

/// Focuses the last focused window of a workspace, falling back to its first
/// window. A workspace without windows focuses its monitor's desktop.
#[derive(Clone, Copy, Debug, Default)]
pub struct FocusLastFocusedWindow {
    pub workspace: Option<WorkspaceId>,
}

impl Transform for FocusLastFocusedWindow {
    type Output = Option<WindowHandle>;

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<Option<WindowHandle>> {
        let current = workspace_or_active(ctx, self.workspace)?;
        let target = current
            .last_focused_window()
            .filter(|window| current.contains_window(*window))
            .or_else(|| current.active_engine().first_window());

        match target {
            Some(window) => ctx.root.workspaces.set_window_to_focus(Some(window)),
            None => {
                if let Some(monitor) = ctx.root.maps.monitor_for_workspace(current.id) {
                    ctx.native.focus_monitor_desktop(monitor);
                }
            }
        }
        Ok(target)
    }
}
