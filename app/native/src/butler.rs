//! The butler: the question-and-errand surface over the store.
//!
//! It answers "where is this window" and "what is on that monitor", and moves
//! windows and workspaces around. Every errand is a single transform dispatch, so
//! the butler itself holds no state beyond the store it serves.

use std::rc::Rc;
use std::sync::Arc;

use crate::geometry::{Direction, Point};
use crate::model::{Monitor, Workspace, WorkspaceId};
use crate::native::{MonitorHandle, WindowHandle};
use crate::store::pickers;
use crate::store::transforms::{
    ActivateAdjacentWorkspace, ActivateWorkspace, FocusMonitorDesktop, FocusWindowInDirection,
    LayoutAllActiveWorkspaces, MergeWorkspaceWindows, MoveWindowEdgesInDirection, MoveWindowToAdjacentMonitor,
    MoveWindowToAdjacentWorkspace, MoveWindowToMonitor, MoveWindowToPoint, MoveWindowToWorkspace,
    SwapWindowInDirection, SwapWorkspaceWithAdjacentMonitor,
};
use crate::store::{Store, StoreResult};

#[derive(Clone)]
pub struct Butler {
    store: Rc<Store>,
}

impl Butler {
    #[must_use]
    pub const fn new(store: Rc<Store>) -> Self { Self { store } }

    #[must_use]
    pub fn store(&self) -> &Store { &self.store }

    // ========================================================================
    // Queries
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error when the window is not tracked.
    pub fn workspace_for_window(&self, window: WindowHandle) -> StoreResult<Arc<Workspace>> {
        self.store.pick(pickers::workspace_by_window(window))
    }

    /// # Errors
    ///
    /// Returns an error when the window is not tracked or its workspace is hidden.
    pub fn monitor_for_window(&self, window: WindowHandle) -> StoreResult<Monitor> {
        self.store.pick(pickers::monitor_by_window(window))
    }

    /// # Errors
    ///
    /// Returns an error when the monitor shows no workspace.
    pub fn workspace_for_monitor(&self, monitor: MonitorHandle) -> StoreResult<Arc<Workspace>> {
        self.store.pick(pickers::workspace_by_monitor(monitor))
    }

    /// # Errors
    ///
    /// Returns an error when the workspace is unknown or hidden.
    pub fn monitor_for_workspace(&self, workspace: WorkspaceId) -> StoreResult<Monitor> {
        self.store.pick(pickers::monitor_by_workspace(workspace))
    }

    // ========================================================================
    // Errands
    // ========================================================================

    /// Shows `workspace` on `monitor`, or on the monitor it was last shown on.
    ///
    /// # Errors
    ///
    /// Returns an error when the workspace or monitor is unknown.
    pub fn activate(&self, workspace: WorkspaceId, monitor: Option<MonitorHandle>) -> StoreResult<()> {
        self.store.dispatch(ActivateWorkspace { workspace, monitor, focus: true })
    }

    /// # Errors
    ///
    /// Returns an error when the monitor shows no workspace or has no neighbour.
    pub fn activate_adjacent(&self, monitor: Option<MonitorHandle>, reverse: bool, skip_active: bool) -> StoreResult<()> {
        self.store.dispatch(ActivateAdjacentWorkspace { monitor, reverse, skip_active })
    }

    /// # Errors
    ///
    /// Returns an error when the window is not tracked or the workspace is unknown.
    pub fn move_window_to_workspace(&self, workspace: WorkspaceId, window: Option<WindowHandle>) -> StoreResult<()> {
        self.store.dispatch(MoveWindowToWorkspace { workspace, window })
    }

    /// # Errors
    ///
    /// Returns an error when the window is not tracked or the monitor shows nothing.
    pub fn move_window_to_monitor(&self, monitor: MonitorHandle, window: Option<WindowHandle>) -> StoreResult<()> {
        self.store.dispatch(MoveWindowToMonitor { monitor, window })
    }

    /// # Errors
    ///
    /// Returns an error when there is a single monitor.
    pub fn move_window_to_adjacent_monitor(&self, window: Option<WindowHandle>, reverse: bool) -> StoreResult<()> {
        self.store.dispatch(MoveWindowToAdjacentMonitor { window, reverse })
    }

    /// # Errors
    ///
    /// Returns an error when the window is not tracked or no workspace qualifies.
    pub fn move_window_to_adjacent_workspace(
        &self,
        window: Option<WindowHandle>,
        reverse: bool,
        skip_active: bool,
    ) -> StoreResult<()> {
        self.store.dispatch(MoveWindowToAdjacentWorkspace { window, reverse, skip_active })
    }

    /// # Errors
    ///
    /// Returns an error when the window is not tracked.
    pub fn move_window_to_point(&self, window: Option<WindowHandle>, point: Point) -> StoreResult<()> {
        self.store.dispatch(MoveWindowToPoint { window, point })
    }

    /// Resizes a window by pixel deltas on one edge.
    ///
    /// # Errors
    ///
    /// Returns an error when the window is not tracked or its workspace is hidden.
    pub fn move_window_edges(&self, edge: Direction, deltas: Point, window: Option<WindowHandle>) -> StoreResult<()> {
        self.store.dispatch(MoveWindowEdgesInDirection { edge, deltas, window })
    }

    /// # Errors
    ///
    /// Returns an error when the workspace is hidden or there is a single monitor.
    pub fn swap_with_adjacent_monitor(&self, workspace: Option<WorkspaceId>, reverse: bool) -> StoreResult<()> {
        self.store.dispatch(SwapWorkspaceWithAdjacentMonitor { workspace, reverse })
    }

    /// # Errors
    ///
    /// Returns an error when either workspace is unknown.
    pub fn merge(&self, source: WorkspaceId, target: WorkspaceId) -> StoreResult<()> {
        self.store.dispatch(MergeWorkspaceWindows { source, target })
    }

    /// Focuses the neighbour of the focused window. Returns the newly focused window.
    ///
    /// # Errors
    ///
    /// Returns an error when no window is focused.
    pub fn focus_in_direction(&self, direction: Direction) -> StoreResult<Option<WindowHandle>> {
        self.store.dispatch(FocusWindowInDirection { direction, window: None })
    }

    /// # Errors
    ///
    /// Returns an error when no window is focused.
    pub fn swap_in_direction(&self, direction: Direction) -> StoreResult<()> {
        self.store.dispatch(SwapWindowInDirection { direction, window: None })
    }

    /// # Errors
    ///
    /// Returns an error when the monitor is unknown.
    pub fn focus_monitor_desktop(&self, monitor: Option<MonitorHandle>) -> StoreResult<()> {
        self.store.dispatch(FocusMonitorDesktop { monitor })
    }

    /// # Errors
    ///
    /// Never fails in practice; kept fallible like every other errand.
    pub fn layout_all(&self) -> StoreResult<()> { self.store.dispatch(LayoutAllActiveWorkspaces) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::fake::FakeNative;
    use crate::store::StoreError;
    use crate::store::test_support::store_with;
    use crate::store::transforms::WindowAdded;

    fn butler(native: &Rc<FakeNative>, workspaces: &[&str]) -> Butler { Butler::new(Rc::new(store_with(native, workspaces))) }

    fn id(butler: &Butler, name: &str) -> WorkspaceId {
        butler.store().pick(pickers::workspace_by_name(name)).unwrap().id
    }

    #[test]
    fn test_queries_follow_the_maps() {
        let native = Rc::new(FakeNative::with_two_monitors());
        let butler = butler(&native, &["left", "right", "spare"]);
        native.add_window(FakeNative::standard_window(1, "app.exe"));
        butler.store().dispatch(WindowAdded::new(WindowHandle(1))).unwrap();

        assert_eq!(butler.workspace_for_monitor(MonitorHandle(2)).unwrap().name, "right");
        assert_eq!(butler.monitor_for_workspace(id(&butler, "left")).unwrap().handle, MonitorHandle(1));
        assert_eq!(butler.workspace_for_window(WindowHandle(1)).unwrap().name, "left");
        assert_eq!(butler.monitor_for_window(WindowHandle(1)).unwrap().handle, MonitorHandle(1));
        assert!(butler.monitor_for_workspace(id(&butler, "spare")).is_err());
    }

    #[test]
    fn test_unknown_window_is_an_error() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let butler = butler(&native, &["one"]);

        assert!(matches!(butler.workspace_for_window(WindowHandle(42)), Err(StoreError::WindowNotFound(_))));
    }

    #[test]
    fn test_swap_then_merge() {
        let native = Rc::new(FakeNative::with_two_monitors());
        let butler = butler(&native, &["left", "right"]);
        let (left, right) = (id(&butler, "left"), id(&butler, "right"));
        native.add_window(FakeNative::standard_window(1, "app.exe"));
        butler.store().dispatch(WindowAdded::new(WindowHandle(1))).unwrap();

        butler.swap_with_adjacent_monitor(None, false).unwrap();
        assert_eq!(butler.workspace_for_monitor(MonitorHandle(2)).unwrap().id, left);

        butler.merge(left, right).unwrap();
        assert_eq!(butler.workspace_for_window(WindowHandle(1)).unwrap().id, right);
    }
}
