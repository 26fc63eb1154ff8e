//! Display topology and monitor focus.

use tracing::{debug, info};

use super::map::show_workspace;
use super::workspace::create_workspace;
use super::{DeactivateWorkspace, LayoutAllActiveWorkspaces, Transform};
use crate::model::{Monitor, MonitorDiff, WorkspaceId, sort_monitors};
use crate::native::MonitorHandle;
use crate::store::TransformContext;
use crate::store::error::{StoreError, StoreResult};
use crate::store::events::MonitorEvent;

/// Re-enumerates the displays and reconciles the snapshot with them.
///
/// Monitors are matched by geometry, so an unchanged display keeps its workspace even
/// when the OS reissued its handle. Workspaces of removed displays are hidden and
/// are the first candidates for added ones. Returns the diff, empty when nothing
/// changed.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonitorsChanged;

impl Transform for MonitorsChanged {
    type Output = MonitorDiff;

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<MonitorDiff> {
        let mut current: Vec<Monitor> = ctx.native.enumerate_monitors()?.into_iter().map(Monitor::from).collect();
        sort_monitors(&mut current);

        let previous = ctx.root.monitors.shared();
        if previous.as_ref() == current.as_slice() {
            return Ok(MonitorDiff::default());
        }

        let diff = MonitorDiff::compute(&previous, &current);
        ctx.root.monitors.set_monitors(current);

        for (old, new) in &diff.reissued {
            debug!(%old, %new, "monitor handle reissued");
        }
        let translate = |monitor: MonitorHandle| {
            diff.reissued.iter().find(|(old, _)| *old == monitor).map_or(monitor, |(_, new)| *new)
        };
        let (active, last_active) = (ctx.root.monitors.active_handle(), ctx.root.monitors.last_active_handle());
        ctx.root.monitors.set_active(translate(active));
        ctx.root.monitors.set_last_active(translate(last_active));

        let removed: Vec<MonitorHandle> = diff.removed.iter().map(|monitor| monitor.handle).collect();
        let mut orphaned = ctx.root.maps.remap_monitors(&removed, &diff.reissued);
        for id in orphaned.clone() {
            debug!(workspace = %id, "monitor removed, hiding its workspace");
            ctx.dispatch(DeactivateWorkspace { workspace: id })?;
        }
        ctx.root.monitors.repair_handles();

        info!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            unchanged = diff.unchanged.len(),
            "monitors changed"
        );
        ctx.root.monitors.queue(MonitorEvent::MonitorsChanged(diff.clone()));

        if ctx.root.workspaces.has_initialized() {
            for added in &diff.added {
                let id = match next_free_workspace(ctx, &mut orphaned) {
                    Some(id) => id,
                    None => create_workspace(ctx, WorkspaceId::new(), None, None)?,
                };
                show_workspace(ctx, added.handle, id);
            }
            ctx.dispatch(LayoutAllActiveWorkspaces)?;
        }

        Ok(diff)
    }
}

/// A hidden workspace for a new monitor, preferring ones that just lost theirs.
fn next_free_workspace(ctx: &TransformContext<'_>, orphaned: &mut Vec<WorkspaceId>) -> Option<WorkspaceId> {
    orphaned.retain(|id| ctx.root.workspaces.contains(*id) && !ctx.root.maps.is_active(*id));
    if !orphaned.is_empty() {
        return Some(orphaned.remove(0));
    }
    ctx.root.workspaces.order().iter().copied().find(|id| !ctx.root.maps.is_active(*id))
}

/// Marks a monitor as active. Focus changes do this implicitly.
#[derive(Clone, Copy, Debug)]
pub struct SetActiveMonitor {
    pub monitor: MonitorHandle,
}

impl Transform for SetActiveMonitor {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        if ctx.root.monitors.get(self.monitor).is_none() {
            return Err(StoreError::MonitorNotFound(self.monitor));
        }
        ctx.root.monitors.set_active(self.monitor);
        Ok(())
    }
}

/// Focuses a monitor's desktop, so keyboard focus leaves every tracked window.
#[derive(Clone, Copy, Debug, Default)]
pub struct FocusMonitorDesktop {
    /// `None` means the active monitor.
    pub monitor: Option<MonitorHandle>,
}

impl Transform for FocusMonitorDesktop {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let monitor = self.monitor.unwrap_or_else(|| ctx.root.monitors.active_handle());
        ctx.dispatch(SetActiveMonitor { monitor })?;
        ctx.native.focus_monitor_desktop(monitor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::native::WindowHandle;
    use crate::native::fake::FakeNative;
    use crate::store::pickers;
    use crate::store::test_support::{record_events, store_with};
    use crate::store::transforms::WindowAdded;
    use crate::store::StoreEvent;

    #[test]
    fn test_unchanged_topology_is_noop() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["one"]);
        let events = record_events(&store);

        let diff = store.dispatch(MonitorsChanged).unwrap();
        assert!(diff.is_empty());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_added_monitor_gets_free_workspace() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["one", "two"]);
        native.set_monitors(vec![FakeNative::monitor(1, 0.0, 0.0, true), FakeNative::monitor(2, 1920.0, 0.0, false)]);

        let diff = store.dispatch(MonitorsChanged).unwrap();

        assert_eq!(diff.added.len(), 1);
        let shown = store.pick(pickers::workspace_by_monitor(MonitorHandle(2))).unwrap();
        assert_eq!(shown.name, "two");
    }

    #[test]
    fn test_added_monitor_without_free_workspace_creates_one() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["one"]);
        native.set_monitors(vec![FakeNative::monitor(1, 0.0, 0.0, true), FakeNative::monitor(2, 1920.0, 0.0, false)]);

        store.dispatch(MonitorsChanged).unwrap();

        assert_eq!(store.pick(pickers::all_workspaces).len(), 2);
        assert_eq!(store.pick(pickers::workspace_by_monitor(MonitorHandle(2))).unwrap().name, "Workspace 2");
    }

    #[test]
    fn test_removed_monitor_hides_its_workspace() {
        let native = Rc::new(FakeNative::with_two_monitors());
        let store = store_with(&native, &["left", "right"]);
        native.add_window(FakeNative::standard_window(1, "app.exe"));
        native.set_window_rect(WindowHandle(1), crate::geometry::Rect::new(2000.0, 0.0, 500.0, 500.0));
        store.dispatch(WindowAdded::new(WindowHandle(1))).unwrap();
        let events = record_events(&store);

        native.set_monitors(vec![FakeNative::monitor(1, 0.0, 0.0, true)]);
        let diff = store.dispatch(MonitorsChanged).unwrap();

        assert_eq!(diff.removed.len(), 1);
        let right = store.pick(pickers::workspace_by_name("right")).unwrap();
        assert!(!store.pick(|root| root.maps.is_active(right.id)));
        assert_eq!(native.hidden_windows(), vec![WindowHandle(1)]);
        assert_eq!(store.pick(pickers::active_monitor).unwrap().handle, MonitorHandle(1));
        assert!(matches!(events.borrow()[0], StoreEvent::Monitor(MonitorEvent::MonitorsChanged(_))));
    }

    #[test]
    fn test_removed_then_restored_monitor_gets_its_workspace_back() {
        let native = Rc::new(FakeNative::with_two_monitors());
        let store = store_with(&native, &["left", "middle", "right"]);

        native.set_monitors(vec![FakeNative::monitor(1, 0.0, 0.0, true)]);
        store.dispatch(MonitorsChanged).unwrap();
        native.set_monitors(vec![FakeNative::monitor(1, 0.0, 0.0, true), FakeNative::monitor(3, 1920.0, 0.0, false)]);
        store.dispatch(MonitorsChanged).unwrap();

        assert_eq!(store.pick(pickers::workspace_by_monitor(MonitorHandle(3))).unwrap().name, "middle");
    }

    #[test]
    fn test_reissued_handle_keeps_assignment() {
        let native = Rc::new(FakeNative::with_two_monitors());
        let store = store_with(&native, &["left", "right"]);
        store.dispatch(SetActiveMonitor { monitor: MonitorHandle(2) }).unwrap();

        native.set_monitors(vec![FakeNative::monitor(1, 0.0, 0.0, true), FakeNative::monitor(7, 1920.0, 0.0, false)]);
        let diff = store.dispatch(MonitorsChanged).unwrap();

        assert!(diff.is_empty());
        assert_eq!(store.pick(pickers::workspace_by_monitor(MonitorHandle(7))).unwrap().name, "right");
        assert_eq!(store.pick(pickers::active_monitor).unwrap().handle, MonitorHandle(7));
    }

    #[test]
    fn test_swapped_handles_keep_both_workspaces() {
        let native = Rc::new(FakeNative::with_two_monitors());
        let store = store_with(&native, &["left", "right"]);
        store.dispatch(SetActiveMonitor { monitor: MonitorHandle(1) }).unwrap();

        native.set_monitors(vec![FakeNative::monitor(2, 0.0, 0.0, true), FakeNative::monitor(1, 1920.0, 0.0, false)]);
        let diff = store.dispatch(MonitorsChanged).unwrap();

        assert!(diff.is_empty());
        assert_eq!(store.pick(pickers::workspace_by_monitor(MonitorHandle(2))).unwrap().name, "left");
        assert_eq!(store.pick(pickers::workspace_by_monitor(MonitorHandle(1))).unwrap().name, "right");
        assert_eq!(store.pick(|root| root.maps.active().count()), 2);
        assert_eq!(store.pick(pickers::active_monitor).unwrap().handle, MonitorHandle(2));
    }

    #[test]
    fn test_removed_handle_reused_by_surviving_monitor() {
        let native = Rc::new(FakeNative::with_two_monitors());
        let store = store_with(&native, &["left", "right"]);

        native.set_monitors(vec![FakeNative::monitor(2, 0.0, 0.0, true)]);
        let diff = store.dispatch(MonitorsChanged).unwrap();

        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.reissued, vec![(MonitorHandle(1), MonitorHandle(2))]);
        assert_eq!(store.pick(pickers::workspace_by_monitor(MonitorHandle(2))).unwrap().name, "left");
        assert_eq!(store.pick(|root| root.maps.active().count()), 1);
        let right = store.pick(pickers::workspace_by_name("right")).unwrap();
        assert!(!store.pick(|root| root.maps.is_active(right.id)));
    }

    #[test]
    fn test_set_active_unknown_monitor() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["one"]);
        let result = store.dispatch(SetActiveMonitor { monitor: MonitorHandle(9) });
        assert!(matches!(result, Err(StoreError::MonitorNotFound(MonitorHandle(9)))));
    }

    #[test]
    fn test_focus_monitor_desktop() {
        let native = Rc::new(FakeNative::with_two_monitors());
        let store = store_with(&native, &["left", "right"]);

        store.dispatch(FocusMonitorDesktop { monitor: Some(MonitorHandle(2)) }).unwrap();

        assert_eq!(native.desktop_focus_calls(), vec![MonitorHandle(2)]);
        assert_eq!(store.pick(pickers::active_monitor).unwrap().handle, MonitorHandle(2));
    }
}
