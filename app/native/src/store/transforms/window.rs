//! Window lifecycle transforms, one per listener event.

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use super::{
    ActivateWorkspace, AddWindowToWorkspace, MinimizeWindowEnd, MinimizeWindowStart, MoveWindowEdgesInDirection,
    MoveWindowToPoint, Transform, resolve_target, workspace, workspace_of,
};
use crate::config::RouterOptions;
use crate::geometry::{Direction, Point, Rect};
use crate::model::{Window, WorkspaceId};
use crate::native::WindowHandle;
use crate::store::error::{IgnoreReason, StoreError, StoreResult};
use crate::store::events::{MapEvent, WindowEvent};
use crate::store::pickers;
use crate::store::TransformContext;

/// Edges closer than this, in pixels, count as unmoved.
const EDGE_TOLERANCE: f64 = 0.5;

/// Reads a window that is not tracked yet and checks it against the filters.
pub(super) fn admit(ctx: &TransformContext<'_>, handle: WindowHandle) -> StoreResult<Window> {
    if ctx.root.windows.contains(handle) {
        return Err(StoreError::WindowIgnored { window: handle, reason: IgnoreReason::AlreadyTracked });
    }

    let info = ctx.native.window_info(handle)?;
    let reason = if info.is_splash_screen {
        Some(IgnoreReason::SplashScreen)
    } else if info.is_cloaked {
        Some(IgnoreReason::Cloaked)
    } else if !info.is_standard {
        Some(IgnoreReason::NotStandard)
    } else if info.has_visible_owner {
        Some(IgnoreReason::HasVisibleOwner)
    } else {
        None
    };

    let window = Window::from(info);
    match reason.or_else(|| ctx.services.filters.should_ignore(&window).then_some(IgnoreReason::Filtered)) {
        Some(reason) => Err(StoreError::WindowIgnored { window: handle, reason }),
        None => Ok(window),
    }
}

/// Starts tracking `window` in workspace `id`.
pub(super) fn track(
    ctx: &mut TransformContext<'_>,
    window: Window,
    id: WorkspaceId,
    point: Option<Point>,
) -> StoreResult<()> {
    workspace(ctx, id)?;
    let handle = window.handle;
    ctx.root.windows.insert(window.clone());
    ctx.dispatch(AddWindowToWorkspace { workspace: id, window: handle, point })?;
    if !ctx.root.maps.is_active(id) {
        ctx.native.hide_window(handle);
    }

    debug!(%window, workspace = %id, "tracking window");
    ctx.root.windows.queue(WindowEvent::WindowAdded { window });
    ctx.root.maps.queue(MapEvent::WindowRouted { window: handle, previous: None, current: Some(id) });
    Ok(())
}

fn route(ctx: &TransformContext<'_>, window: &Window, options: Option<RouterOptions>) -> StoreResult<WorkspaceId> {
    if let Some(target) = ctx.services.router.route(window) {
        match resolve_target(ctx, &target) {
            Ok(workspace) => return Ok(workspace.id),
            Err(err) => warn!(%window, %target, error = %err, "route target does not exist"),
        }
    }

    let launched = || {
        ctx.native
            .monitor_from_window(window.handle)
            .and_then(|monitor| ctx.root.maps.workspace_for_monitor(monitor))
    };
    let candidate = match options.unwrap_or_else(|| ctx.services.router.options()) {
        RouterOptions::RouteToLaunchedWorkspace => launched(),
        RouterOptions::RouteToActiveWorkspace => ctx.root.maps.workspace_for_monitor(ctx.root.monitors.active_handle()),
        RouterOptions::RouteToLastTrackedActiveWorkspace => {
            ctx.root.maps.workspace_for_monitor(ctx.root.monitors.last_active_handle())
        }
    };

    match candidate.filter(|id| ctx.root.workspaces.contains(*id)).or_else(launched) {
        Some(id) => Ok(id),
        None => ctx.pick(pickers::active_workspace).map(|workspace| workspace.id),
    }
}

/// A window appeared. Filters it, routes it and starts tracking it.
#[derive(Clone, Copy, Debug)]
pub struct WindowAdded {
    pub window: WindowHandle,
    /// Overrides the router's fallback option.
    pub router_options: Option<RouterOptions>,
}

impl WindowAdded {
    #[must_use]
    pub const fn new(window: WindowHandle) -> Self { Self { window, router_options: None } }

    #[must_use]
    pub const fn with_router_options(mut self, options: RouterOptions) -> Self {
        self.router_options = Some(options);
        self
    }
}

impl Transform for WindowAdded {
    type Output = WorkspaceId;

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<WorkspaceId> {
        let window = admit(ctx, self.window)?;
        let id = route(ctx, &window, self.router_options)?;
        let minimized = window.is_minimized;
        track(ctx, window, id, None)?;

        if !minimized && !ctx.root.windows.is_startup_window(self.window) && ctx.root.maps.is_active(id) {
            ctx.root.workspaces.set_window_to_focus(Some(self.window));
        }
        Ok(id)
    }
}

/// A window was destroyed.
#[derive(Clone, Copy, Debug)]
pub struct WindowRemoved {
    pub window: WindowHandle,
}

impl Transform for WindowRemoved {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let removed = ctx.root.windows.remove(self.window);
        let previous = ctx.root.maps.remove_window(self.window);
        if removed.is_none() && previous.is_none() {
            return Err(StoreError::WindowNotFound(self.window));
        }

        if let Some(id) = previous
            && let Some(current) = ctx.root.workspaces.get(id).cloned()
        {
            if let Some(updated) = current.without_window(self.window) {
                ctx.root.workspaces.replace(updated);
            }
            ctx.root.workspaces.queue_layout(id);
        }
        if ctx.root.workspaces.window_to_focus() == Some(self.window) {
            ctx.root.workspaces.set_window_to_focus(None);
        }

        if let Some(window) = removed {
            debug!(%window, "window removed");
            ctx.root.windows.queue(WindowEvent::WindowRemoved { window });
        }
        ctx.root.maps.queue(MapEvent::WindowRouted { window: self.window, previous, current: None });
        Ok(())
    }
}

/// A window was hidden. Windows hidden by a workspace switch stay tracked.
#[derive(Clone, Copy, Debug)]
pub struct WindowHidden {
    pub window: WindowHandle,
}

impl Transform for WindowHidden {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let id = ctx.root.maps.workspace_for_window(self.window).ok_or(StoreError::WindowNotFound(self.window))?;
        if !ctx.root.maps.is_active(id) {
            trace!(window = %self.window, "ignoring window hidden with its workspace");
            return Ok(());
        }
        ctx.dispatch(WindowRemoved { window: self.window })
    }
}

/// The foreground window changed.
///
/// An untracked window is offered to [`WindowAdded`] first. Focusing a window of a
/// hidden workspace brings that workspace up.
#[derive(Clone, Copy, Debug)]
pub struct WindowFocused {
    pub window: Option<WindowHandle>,
}

impl Transform for WindowFocused {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        if let Some(handle) = self.window
            && !ctx.root.windows.contains(handle)
            && let Err(err) = ctx.dispatch(WindowAdded::new(handle))
        {
            trace!(window = %handle, error = %err, "focused window not added");
        }

        let window = self.window.filter(|w| ctx.root.windows.contains(*w));
        ctx.root.windows.queue(WindowEvent::WindowFocused { window });

        let Some(handle) = self.window else {
            return Ok(());
        };

        let Some(id) = ctx.root.maps.workspace_for_window(handle) else {
            if let Some(monitor) = ctx.native.monitor_from_window(handle)
                && ctx.root.monitors.get(monitor).is_some()
            {
                ctx.root.monitors.set_active(monitor);
            }
            return Ok(());
        };

        if !ctx.root.maps.is_active(id) {
            debug!(window = %handle, workspace = %id, "focused window is on a hidden workspace");
            ctx.dispatch(ActivateWorkspace { workspace: id, monitor: None, focus: false })?;
        }

        let current = workspace(ctx, id)?;
        if let Some(updated) = current.with_last_focused_window(Some(handle)) {
            ctx.root.workspaces.replace(updated);
        }
        if let Some(monitor) = ctx.root.maps.monitor_for_workspace(id) {
            ctx.root.monitors.set_active(monitor);
            ctx.root.monitors.set_last_active(monitor);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct WindowMoveStarted {
    pub window: WindowHandle,
}

impl Transform for WindowMoveStarted {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        if !ctx.root.windows.contains(self.window) {
            return Err(StoreError::WindowNotFound(self.window));
        }
        ctx.root.windows.set_moving(Some(self.window));
        let cursor = ctx.native.cursor_position();
        ctx.root.windows.queue(WindowEvent::WindowMoveStarted { window: self.window, cursor });
        Ok(())
    }
}

/// A window's location changed. Only reported while the user drags it.
#[derive(Clone, Copy, Debug)]
pub struct WindowMoved {
    pub window: WindowHandle,
}

impl Transform for WindowMoved {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        if !ctx.root.windows.contains(self.window) {
            return Err(StoreError::WindowNotFound(self.window));
        }
        if ctx.root.windows.moving() == Some(self.window) {
            let cursor = ctx.native.cursor_position();
            ctx.root.windows.queue(WindowEvent::WindowMoved { window: self.window, cursor });
        }
        Ok(())
    }
}

/// The user released a window.
///
/// When exactly one edge per axis moved the window was resized and the engine is
/// asked to move those edges. Anything else is a move, and the window is placed
/// at the cursor.
#[derive(Clone, Copy, Debug)]
pub struct WindowMoveEnded {
    pub window: WindowHandle,
}

impl Transform for WindowMoveEnded {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        if !ctx.root.windows.contains(self.window) {
            return Err(StoreError::WindowNotFound(self.window));
        }
        ctx.root.windows.set_moving(None);
        let cursor = ctx.native.cursor_position();
        ctx.root.windows.queue(WindowEvent::WindowMoveEnded { window: self.window, cursor });

        let current = workspace_of(ctx, self.window)?;
        let stored = ctx.root.workspaces.window_position(current.id, self.window).map(|p| p.rect);
        let actual = ctx.native.window_rect(self.window);

        if let (Some(stored), Some(actual)) = (stored, actual)
            && let Some(edges) = moved_edges(&stored, &actual)
        {
            for (edge, deltas) in edges {
                ctx.dispatch(MoveWindowEdgesInDirection { edge, deltas, window: Some(self.window) })?;
            }
            return Ok(());
        }

        match cursor {
            Some(point) => ctx.dispatch(MoveWindowToPoint { window: Some(self.window), point }),
            None => {
                ctx.root.workspaces.queue_layout(current.id);
                Ok(())
            }
        }
    }
}

/// The edges that moved between `stored` and `actual`, with their pixel deltas, or
/// `None` when the window moved rather than resized.
fn moved_edges(stored: &Rect, actual: &Rect) -> Option<SmallVec<[(Direction, Point); 2]>> {
    let moved = |a: f64, b: f64| (a - b).abs() > EDGE_TOLERANCE;
    let left = moved(stored.x, actual.x);
    let right = moved(stored.right(), actual.right());
    let top = moved(stored.y, actual.y);
    let bottom = moved(stored.bottom(), actual.bottom());
    if (left && right) || (top && bottom) {
        return None;
    }

    let mut edges = SmallVec::new();
    if left {
        edges.push((Direction::Left, Point::new(actual.x - stored.x, 0.0)));
    }
    if right {
        edges.push((Direction::Right, Point::new(actual.right() - stored.right(), 0.0)));
    }
    if top {
        edges.push((Direction::Up, Point::new(0.0, actual.y - stored.y)));
    }
    if bottom {
        edges.push((Direction::Down, Point::new(0.0, actual.bottom() - stored.bottom())));
    }
    (!edges.is_empty()).then_some(edges)
}

#[derive(Clone, Copy, Debug)]
pub struct WindowMinimizeStarted {
    pub window: WindowHandle,
}

impl Transform for WindowMinimizeStarted {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let current = workspace_of(ctx, self.window)?;
        ctx.root.windows.set_minimized(self.window, true);
        ctx.dispatch(MinimizeWindowStart { workspace: current.id, window: self.window })?;
        ctx.root.windows.queue(WindowEvent::WindowMinimizeStarted { window: self.window });
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct WindowMinimizeEnded {
    pub window: WindowHandle,
}

impl Transform for WindowMinimizeEnded {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let current = workspace_of(ctx, self.window)?;
        ctx.root.windows.set_minimized(self.window, false);
        ctx.dispatch(MinimizeWindowEnd { workspace: current.id, window: self.window })?;
        ctx.root.windows.queue(WindowEvent::WindowMinimizeEnded { window: self.window });
        ctx.root.workspaces.set_window_to_focus(Some(self.window));
        Ok(())
    }
}

/// Lays out the workspace of a window again, e.g. after an app moved itself.
#[derive(Clone, Copy, Debug)]
pub struct RelayoutWindowWorkspace {
    pub window: WindowHandle,
}

impl Transform for RelayoutWindowWorkspace {
    type Output = ();

    fn execute(self, ctx: &mut TransformContext<'_>) -> StoreResult<()> {
        let current = workspace_of(ctx, self.window)?;
        ctx.root.workspaces.queue_layout(current.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::config::WindowRule;
    use crate::filter::FilterChain;
    use crate::layout::{ColumnLayoutEngine, MasterStackLayoutEngine, master::MasterPosition};
    use crate::native::fake::FakeNative;
    use crate::native::{MonitorHandle, NativeApi, WindowSize};
    use crate::router::{Router, WorkspaceTarget};
    use crate::store::sectors::EngineCreator;
    use crate::store::test_support::{record_events, store_with};
    use crate::native::WindowInfo;
    use crate::store::transforms::{AddWorkspace, InitializeWorkspaces, MonitorsChanged, SetActiveMonitor, SetEngineCreators};
    use crate::store::{Store, StoreEvent, StoreServices};

    fn add(native: &FakeNative, store: &Store, handle: isize) -> StoreResult<WorkspaceId> {
        native.add_window(FakeNative::standard_window(handle, "app.exe"));
        store.dispatch(WindowAdded::new(WindowHandle(handle)))
    }

    fn services_store(native: &Rc<FakeNative>, services: StoreServices, names: &[&str]) -> Store {
        let store = Store::new(Rc::clone(native) as Rc<dyn NativeApi>, services);
        store
            .dispatch(SetEngineCreators(vec![EngineCreator::new(|| ColumnLayoutEngine::new_ref(true))]))
            .unwrap();
        store.dispatch(MonitorsChanged).unwrap();
        for name in names {
            store.dispatch(AddWorkspace::named(*name)).unwrap();
        }
        store.dispatch(InitializeWorkspaces::default()).unwrap();
        store
    }

    #[test]
    fn test_added_window_is_tracked_laid_out_and_focused() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["a"]);
        let events = record_events(&store);

        let id = add(&native, &store, 1).unwrap();

        assert_eq!(store.pick(pickers::workspace_by_window(WindowHandle(1))).unwrap().id, id);
        assert_eq!(native.focus_calls(), vec![WindowHandle(1)]);
        assert_eq!(native.last_position(WindowHandle(1)).unwrap().rect, Rect::new(0.0, 0.0, 1920.0, 1040.0));
        let events = events.borrow();
        assert!(matches!(events[0], StoreEvent::Window(WindowEvent::WindowAdded { .. })));
        assert!(events.iter().any(|e| matches!(e, StoreEvent::Map(MapEvent::WindowRouted { previous: None, .. }))));
    }

    #[test]
    fn test_ignored_windows() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["a"]);

        let cases: [(IgnoreReason, fn(&mut WindowInfo)); 4] = [
            (IgnoreReason::SplashScreen, |info| info.is_splash_screen = true),
            (IgnoreReason::Cloaked, |info| info.is_cloaked = true),
            (IgnoreReason::NotStandard, |info| info.is_standard = false),
            (IgnoreReason::HasVisibleOwner, |info| info.has_visible_owner = true),
        ];
        for (idx, (expected, tweak)) in cases.into_iter().enumerate() {
            let handle = WindowHandle(10 + isize::try_from(idx).unwrap());
            let mut info = FakeNative::standard_window(handle.0, "app.exe");
            tweak(&mut info);
            native.add_window(info);

            let result = store.dispatch(WindowAdded::new(handle));
            assert!(matches!(result, Err(StoreError::WindowIgnored { reason, .. }) if reason == expected));
        }

        add(&native, &store, 1).unwrap();
        let again = store.dispatch(WindowAdded::new(WindowHandle(1)));
        assert!(matches!(again, Err(StoreError::WindowIgnored { reason: IgnoreReason::AlreadyTracked, .. })));
    }

    #[test]
    fn test_filtered_window_is_ignored() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let services = StoreServices {
            filters: FilterChain::with_defaults().with_rules([WindowRule::process("app.exe")]),
            router: Router::default(),
        };
        let store = services_store(&native, services, &["a"]);

        let result = add(&native, &store, 1);
        assert!(matches!(result, Err(StoreError::WindowIgnored { reason: IgnoreReason::Filtered, .. })));
    }

    #[test]
    fn test_router_sends_window_to_named_workspace() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let mut router = Router::default();
        router.add(|window| window.is_process("app.exe").then(|| WorkspaceTarget::Name("chat".to_string())));
        let services = StoreServices { filters: FilterChain::default(), router };
        let store = services_store(&native, services, &["main", "chat"]);

        let id = add(&native, &store, 1).unwrap();

        let chat = store.pick(pickers::workspace_by_name("chat")).unwrap();
        assert_eq!(id, chat.id);
        assert_eq!(native.hidden_windows(), vec![WindowHandle(1)]);
        assert!(native.focus_calls().is_empty());
    }

    #[test]
    fn test_active_workspace_routing() {
        let native = Rc::new(FakeNative::with_two_monitors());
        let services = StoreServices {
            filters: FilterChain::default(),
            router: Router::new(RouterOptions::RouteToActiveWorkspace),
        };
        let store = services_store(&native, services, &["left", "right"]);
        store.dispatch(SetActiveMonitor { monitor: MonitorHandle(2) }).unwrap();

        let id = add(&native, &store, 1).unwrap();
        assert_eq!(store.pick(pickers::workspace_by_id(id)).unwrap().name, "right");
    }

    #[test]
    fn test_minimized_window_starts_minimized() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["a"]);
        let mut info = FakeNative::standard_window(1, "app.exe");
        info.is_minimized = true;
        native.add_window(info);

        store.dispatch(WindowAdded::new(WindowHandle(1))).unwrap();

        assert_eq!(native.last_position(WindowHandle(1)).unwrap().size, WindowSize::Minimized);
        assert!(native.focus_calls().is_empty());
    }

    #[test]
    fn test_removed_window_leaves_its_workspace() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["a"]);
        add(&native, &store, 1).unwrap();
        add(&native, &store, 2).unwrap();

        store.dispatch(WindowRemoved { window: WindowHandle(1) }).unwrap();

        let workspace = store.pick(pickers::active_workspace).unwrap();
        assert_eq!(workspace.windows(), &[WindowHandle(2)]);
        assert_eq!(native.last_position(WindowHandle(2)).unwrap().rect.width, 1920.0);
        assert!(matches!(
            store.dispatch(WindowRemoved { window: WindowHandle(1) }),
            Err(StoreError::WindowNotFound(_))
        ));
    }

    #[test]
    fn test_hidden_window_in_hidden_workspace_stays_tracked() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let mut router = Router::default();
        router.add(|_| Some(WorkspaceTarget::Name("hidden".to_string())));
        let services = StoreServices { filters: FilterChain::default(), router };
        let store = services_store(&native, services, &["shown", "hidden"]);
        add(&native, &store, 1).unwrap();

        store.dispatch(WindowHidden { window: WindowHandle(1) }).unwrap();
        assert!(store.pick(pickers::window_by_handle(WindowHandle(1))).is_ok());
    }

    #[test]
    fn test_hidden_window_in_shown_workspace_is_removed() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["a"]);
        add(&native, &store, 1).unwrap();

        store.dispatch(WindowHidden { window: WindowHandle(1) }).unwrap();
        assert!(store.pick(pickers::window_by_handle(WindowHandle(1))).is_err());
    }

    #[test]
    fn test_focus_updates_last_focused_and_active_monitor() {
        let native = Rc::new(FakeNative::with_two_monitors());
        native.add_window(FakeNative::standard_window(1, "app.exe"));
        native.set_window_rect(WindowHandle(1), Rect::new(2000.0, 100.0, 800.0, 600.0));
        let store = store_with(&native, &["left", "right"]);

        store.dispatch(WindowFocused { window: Some(WindowHandle(1)) }).unwrap();

        let right = store.pick(pickers::workspace_by_name("right")).unwrap();
        assert_eq!(right.last_focused_window(), Some(WindowHandle(1)));
        assert_eq!(store.pick(pickers::active_monitor).unwrap().handle, MonitorHandle(2));
        assert_eq!(store.pick(pickers::last_active_monitor).unwrap().handle, MonitorHandle(2));
    }

    #[test]
    fn test_focusing_untracked_window_adds_it() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["main"]);
        native.add_window(FakeNative::standard_window(1, "app.exe"));
        let events = record_events(&store);

        store.dispatch(WindowFocused { window: Some(WindowHandle(1)) }).unwrap();

        let main = store.pick(pickers::workspace_by_name("main")).unwrap();
        assert_eq!(main.last_focused_window(), Some(WindowHandle(1)));
        let events = events.borrow();
        let added = events.iter().position(|e| matches!(e, StoreEvent::Window(WindowEvent::WindowAdded { .. })));
        let focused = events.iter().position(|e| {
            *e == StoreEvent::Window(WindowEvent::WindowFocused { window: Some(WindowHandle(1)) })
        });
        assert!(added.is_some());
        assert!(added < focused);
    }

    #[test]
    fn test_focusing_ignored_window_reports_no_window() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["main"]);
        native.add_window(WindowInfo { is_standard: false, ..FakeNative::standard_window(1, "app.exe") });
        let events = record_events(&store);

        store.dispatch(WindowFocused { window: Some(WindowHandle(1)) }).unwrap();

        assert!(store.pick(pickers::window_by_handle(WindowHandle(1))).is_err());
        assert_eq!(*events.borrow(), vec![StoreEvent::Window(WindowEvent::WindowFocused { window: None })]);
    }

    #[test]
    fn test_focusing_window_on_hidden_workspace_shows_it() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let mut router = Router::default();
        router.add(|_| Some(WorkspaceTarget::Name("hidden".to_string())));
        let services = StoreServices { filters: FilterChain::default(), router };
        let store = services_store(&native, services, &["shown", "hidden"]);
        add(&native, &store, 1).unwrap();

        store.dispatch(WindowFocused { window: Some(WindowHandle(1)) }).unwrap();
        assert_eq!(store.pick(pickers::active_workspace).unwrap().name, "hidden");
    }

    #[test]
    fn test_move_end_places_window_at_cursor() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["a"]);
        add(&native, &store, 1).unwrap();
        add(&native, &store, 2).unwrap();

        store.dispatch(WindowMoveStarted { window: WindowHandle(1) }).unwrap();
        native.set_window_rect(WindowHandle(1), Rect::new(1400.0, 100.0, 800.0, 600.0));
        native.set_cursor(Point::new(1500.0, 500.0));
        store.dispatch(WindowMoveEnded { window: WindowHandle(1) }).unwrap();

        assert_eq!(native.last_position(WindowHandle(1)).unwrap().rect.x, 960.0);
        assert_eq!(native.last_position(WindowHandle(2)).unwrap().rect.x, 0.0);
        assert_eq!(store.pick(pickers::moving_window), None);
    }

    #[test]
    fn test_move_end_after_resize_moves_edges() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = Store::new(Rc::clone(&native) as Rc<dyn NativeApi>, StoreServices::default());
        store
            .dispatch(SetEngineCreators(vec![EngineCreator::new(|| {
                MasterStackLayoutEngine::new_ref(0.5, MasterPosition::Left)
            })]))
            .unwrap();
        store.dispatch(MonitorsChanged).unwrap();
        store.dispatch(InitializeWorkspaces::default()).unwrap();
        add(&native, &store, 1).unwrap();
        add(&native, &store, 2).unwrap();
        let before = native.last_position(WindowHandle(1)).unwrap().rect;

        native.set_window_rect(WindowHandle(1), Rect::new(before.x, before.y, before.width + 192.0, before.height));
        store.dispatch(WindowMoveEnded { window: WindowHandle(1) }).unwrap();

        let after = native.last_position(WindowHandle(1)).unwrap().rect;
        assert!(after.width > before.width);
        assert_eq!(after.x, before.x);
    }

    #[test]
    fn test_moved_edges() {
        let stored = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(moved_edges(&stored, &Rect::new(10.0, 0.0, 100.0, 100.0)).is_none());
        assert!(moved_edges(&stored, &stored).is_none());

        let edges = moved_edges(&stored, &Rect::new(0.0, 0.0, 120.0, 90.0)).unwrap();
        assert_eq!(edges.as_slice(), &[
            (Direction::Right, Point::new(20.0, 0.0)),
            (Direction::Down, Point::new(0.0, -10.0)),
        ]);
    }

    #[test]
    fn test_minimize_round_trip() {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = store_with(&native, &["a"]);
        add(&native, &store, 1).unwrap();
        add(&native, &store, 2).unwrap();

        store.dispatch(WindowMinimizeStarted { window: WindowHandle(1) }).unwrap();
        assert_eq!(native.last_position(WindowHandle(2)).unwrap().rect.width, 1920.0);
        assert!(store.pick(pickers::window_by_handle(WindowHandle(1))).unwrap().is_minimized);

        store.dispatch(WindowMinimizeEnded { window: WindowHandle(1) }).unwrap();
        assert_eq!(native.last_position(WindowHandle(2)).unwrap().rect.width, 960.0);
        assert_eq!(native.focus_calls().last(), Some(&WindowHandle(1)));
    }
}
