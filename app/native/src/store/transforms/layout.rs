//! Layout passes.
//!
//! Transforms only queue workspaces for layout. The pass itself runs once per flush,
//! so a dispatch that touches a workspace several times still moves its windows once.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use super::{MinimizeWindowEnd, Transform, WindowFocused, WindowRemoved};
use crate::model::WorkspaceId;
use crate::native::DeferredPositions;
use crate::store::error::{StoreError, StoreResult};
use crate::store::events::WorkspaceEvent;
use crate::store::TransformContext;

/// Lays out every queued workspace and applies the pending focus.
///
/// Every visible workspace's placements go into one [`DeferredPositions`] batch.
/// Windows that no longer exist are dropped from their workspace before layout.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutPass;

impl Transform for LayoutPass {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        if let Some(window) = ctx.root.workspaces.window_to_focus()
            && let Some(id) = ctx.root.maps.workspace_for_window(window)
        {
            ctx.root.workspaces.queue_layout(id);
            if ctx.root.windows.get(window).is_some_and(|w| w.is_minimized) {
                ctx.root.windows.set_minimized(window, false);
                ctx.dispatch(MinimizeWindowEnd { workspace: id, window })?;
            }
        }

        let mut pending = ctx.root.workspaces.take_to_layout();
        collect_garbage(ctx, pending.iter().copied().collect());
        pending.append(&mut ctx.root.workspaces.take_to_layout());

        let native = ctx.native;
        let mut batch = DeferredPositions::new(native);
        let mut laid_out = Vec::with_capacity(pending.len());

        for id in pending {
            let Some(monitor) = ctx.root.maps.monitor_for_workspace(id).and_then(|m| ctx.root.monitors.get(m)).cloned()
            else {
                trace!(workspace = %id, "skipping layout of hidden workspace");
                continue;
            };
            let Some(workspace) = ctx.root.workspaces.get(id).cloned() else {
                continue;
            };

            ctx.root.workspaces.queue(WorkspaceEvent::WorkspaceLayoutStarted { id });
            let mut positions = BTreeMap::new();
            for placement in workspace.active_engine().do_layout(monitor.working_area, &monitor) {
                let position = placement.to_position();
                batch.defer(position);
                positions.insert(position.handle, position);
            }
            debug!(workspace = %workspace, windows = positions.len(), "laid out workspace");
            ctx.root.workspaces.set_window_positions(id, positions);
            laid_out.push(id);
        }

        if let Err(err) = batch.commit() {
            warn!(error = %err, "failed to apply window positions");
        }
        for id in laid_out {
            ctx.root.workspaces.queue(WorkspaceEvent::WorkspaceLayoutCompleted { id });
        }

        if let Some(window) = ctx.root.workspaces.window_to_focus() {
            ctx.root.workspaces.set_window_to_focus(None);
            native.focus_window(window);
            ctx.dispatch(WindowFocused { window: Some(window) })?;
        }

        Ok(())
    }
}

fn collect_garbage(ctx: &mut TransformContext<'_>, workspaces: Vec<WorkspaceId>) {
    let stale: Vec<_> = workspaces
        .into_iter()
        .filter_map(|id| ctx.root.workspaces.get(id))
        .flat_map(|workspace| workspace.windows().to_vec())
        .filter(|window| !ctx.native.is_window(*window))
        .collect();

    for window in stale {
        debug!(%window, "removing window that no longer exists");
        if let Err(err) = ctx.dispatch(WindowRemoved { window }) {
            debug!(%window, error = %err, "failed to remove stale window");
        }
    }
}

/// Queues one workspace for layout.
#[derive(Clone, Copy, Debug)]
pub struct DoWorkspaceLayout {
    pub workspace: WorkspaceId,
}

impl Transform for DoWorkspaceLayout {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        if !ctx.root.workspaces.contains(self.workspace) {
            return Err(StoreError::WorkspaceNotFound(self.workspace));
        }
        ctx.root.workspaces.queue_layout(self.workspace);
        Ok(())
    }
}

/// Queues every visible workspace for layout.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutAllActiveWorkspaces;

impl Transform for LayoutAllActiveWorkspaces {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let active: Vec<_> = ctx.root.maps.active().map(|(_, id)| id).collect();
        for id in active {
            ctx.root.workspaces.queue_layout(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::native::fake::FakeNative;
    use crate::native::{WindowHandle, WindowSize};
    use crate::store::pickers;
    use crate::store::test_support::{record_events, store_with};
    use crate::store::{StoreEvent, WindowEvent};

    fn store_with_windows(native: &Rc<FakeNative>, handles: &[isize]) -> crate::store::Store {
        for handle in handles {
            native.add_window(FakeNative::standard_window(*handle, "app.exe"));
        }
        store_with(native, &["a"])
    }

    #[test]
    fn test_layout_pass_issues_one_batch() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with_windows(&native, &[1, 2, 3]);
        native.clear_recorded();

        store.dispatch(LayoutAllActiveWorkspaces).unwrap();

        let batches = native.position_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 3);
        assert!(batches[0].iter().all(|p| p.size == WindowSize::Normal));
    }

    #[test]
    fn test_layout_events_bracket_the_pass() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with_windows(&native, &[1]);
        let id = store.pick(pickers::active_workspace).unwrap().id;
        let events = record_events(&store);

        store.dispatch(DoWorkspaceLayout { workspace: id }).unwrap();

        assert_eq!(
            *events.borrow(),
            vec![
                StoreEvent::from(WorkspaceEvent::WorkspaceLayoutStarted { id }),
                StoreEvent::from(WorkspaceEvent::WorkspaceLayoutCompleted { id }),
            ]
        );
    }

    #[test]
    fn test_positions_are_recorded_per_workspace() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with_windows(&native, &[1, 2]);
        let id = store.pick(pickers::active_workspace).unwrap().id;

        let position = store.pick(pickers::window_position(id, WindowHandle(2))).unwrap();
        assert_eq!(position.rect.x, 960.0);
        assert_eq!(position.rect.width, 960.0);
        assert_eq!(position.rect.height, 1040.0);
    }

    #[test]
    fn test_vanished_windows_are_collected() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with_windows(&native, &[1, 2]);
        let events = record_events(&store);
        native.remove_window(WindowHandle(2));

        store.dispatch(LayoutAllActiveWorkspaces).unwrap();

        assert!(store.pick(pickers::window_by_handle(WindowHandle(2))).is_err());
        let workspace = store.pick(pickers::active_workspace).unwrap();
        assert_eq!(workspace.windows(), &[WindowHandle(1)]);
        assert!(events.borrow().iter().any(|e| matches!(
            e,
            StoreEvent::Window(WindowEvent::WindowRemoved { window }) if window.handle == WindowHandle(2)
        )));
    }

    #[test]
    fn test_unknown_workspace_layout_fails() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["a"]);
        let result = store.dispatch(DoWorkspaceLayout { workspace: WorkspaceId::new() });
        assert!(matches!(result, Err(StoreError::WorkspaceNotFound(_))));
    }

    #[test]
    fn test_positioning_failure_is_not_an_error() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with_windows(&native, &[1]);
        native.fail_positioning(true);
        assert!(store.dispatch(LayoutAllActiveWorkspaces).is_ok());
    }
}
