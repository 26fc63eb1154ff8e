//! Window event ingestion.
//!
//! The OS window hooks call back on the owner thread with raw events. The listener
//! runs each event past the window's processor, if it has one, and translates what
//! survives into a store transform. Work that has to wait (relayouts after an app
//! restored its own position, monitor re-scans after display changes) goes through
//! the [`Scheduler`] and comes back as an [`OwnerMessage`]. Each entry point runs
//! inside the shared [`PanicBoundary`].

pub mod event;
pub mod processor;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

pub use event::{RawWindowEvent, WindowEventKind};
pub use processor::{ProcessorRegistry, ProcessorResult, WindowProcessor};
use tracing::{debug, trace};

use crate::model::Window;
use crate::native::WindowHandle;
use crate::platform::{OwnerMessage, PanicBoundary};
use crate::store::transforms::{
    MonitorsChanged, RelayoutWindowWorkspace, WindowAdded, WindowFocused, WindowHidden, WindowMinimizeEnded,
    WindowMinimizeStarted, WindowMoveEnded, WindowMoveStarted, WindowMoved, WindowRemoved,
};
use crate::store::{Store, StoreError, StoreResult};
use crate::timer::{Generation, MONITOR_RESCAN_DELAY, RELAYOUT_DELAY, Scheduler};

pub struct WindowEventListener {
    store: Rc<Store>,
    registry: ProcessorRegistry,
    /// `None` marks windows that have no processor, or whose processor is done.
    processors: RefCell<HashMap<WindowHandle, Option<WindowProcessor>>>,
    scheduler: Rc<dyn Scheduler>,
    boundary: Rc<PanicBoundary>,
    relayouts: RefCell<HashMap<WindowHandle, u64>>,
    next_relayout: Cell<u64>,
    rescan: Generation,
}

impl WindowEventListener {
    #[must_use]
    pub fn new(
        store: Rc<Store>,
        registry: ProcessorRegistry,
        scheduler: Rc<dyn Scheduler>,
        boundary: Rc<PanicBoundary>,
    ) -> Self {
        Self {
            store,
            registry,
            processors: RefCell::new(HashMap::new()),
            scheduler,
            boundary,
            relayouts: RefCell::new(HashMap::new()),
            next_relayout: Cell::new(0),
            rescan: Generation::default(),
        }
    }

    pub fn handle(&self, event: RawWindowEvent) { self.handle_at(event, Instant::now()); }

    pub fn handle_at(&self, event: RawWindowEvent, now: Instant) {
        self.boundary.run("window event", || self.apply(event, now));
    }

    fn apply(&self, event: RawWindowEvent, now: Instant) {
        match self.consult_processor(event, now) {
            ProcessorResult::Ignore => {
                trace!(window = %event.window, kind = %event.kind, "event held back by processor");
                return;
            }
            ProcessorResult::IgnoreAndRelayout => {
                self.schedule_relayout(event.window);
                return;
            }
            ProcessorResult::Process | ProcessorResult::ProcessAndForget => {}
        }

        if event.kind == WindowEventKind::Destroyed {
            self.processors.borrow_mut().remove(&event.window);
            self.relayouts.borrow_mut().remove(&event.window);
        }

        match self.translate(event) {
            Ok(()) | Err(StoreError::WindowNotFound(_)) => {}
            Err(err @ StoreError::WindowIgnored { .. }) => trace!(error = %err, "window not managed"),
            Err(err) => debug!(window = %event.window, kind = %event.kind, error = %err, "event not applied"),
        }
    }

    /// A display or session change was reported. Monitors are re-scanned once the
    /// notifications settle.
    pub fn display_changed(&self) {
        let generation = self.rescan.advance();
        self.scheduler.schedule(MONITOR_RESCAN_DELAY, OwnerMessage::RescanMonitors { generation });
    }

    /// Handles a delayed [`OwnerMessage::RescanMonitors`].
    pub fn rescan_monitors(&self, generation: u64) {
        if !self.rescan.is_current(generation) {
            trace!(generation, "dropping superseded monitor rescan");
            return;
        }
        if let Some(Err(err)) = self.boundary.run("monitor rescan", || self.store.dispatch(MonitorsChanged)) {
            debug!(error = %err, "monitor rescan failed");
        }
    }

    /// Handles a delayed [`OwnerMessage::RelayoutWindow`]. A window that was held
    /// back before the store ever saw it is offered to the store now.
    pub fn relayout(&self, window: WindowHandle, generation: u64) {
        {
            let mut relayouts = self.relayouts.borrow_mut();
            if relayouts.get(&window) != Some(&generation) {
                trace!(%window, generation, "dropping superseded relayout");
                return;
            }
            relayouts.remove(&window);
        }

        let result = self.boundary.run("delayed relayout", || {
            if self.is_tracked(window) {
                self.store.dispatch(RelayoutWindowWorkspace { window })
            } else {
                self.store.dispatch(WindowAdded::new(window)).map(|_| ())
            }
        });
        if let Some(Err(err)) = result {
            debug!(%window, error = %err, "delayed relayout not applied");
        }
    }

    fn is_tracked(&self, window: WindowHandle) -> bool { self.store.pick(|root| root.windows.contains(window)) }

    fn schedule_relayout(&self, window: WindowHandle) {
        let generation = self.next_relayout.get() + 1;
        self.next_relayout.set(generation);
        self.relayouts.borrow_mut().insert(window, generation);
        self.scheduler.schedule(RELAYOUT_DELAY, OwnerMessage::RelayoutWindow { window, generation });
    }

    fn consult_processor(&self, event: RawWindowEvent, now: Instant) -> ProcessorResult {
        let mut processors = self.processors.borrow_mut();
        if !processors.contains_key(&event.window) {
            if !event.kind.may_add_window() && !self.is_tracked(event.window) {
                return ProcessorResult::Process;
            }
            let Some(window) = self.describe(event.window) else {
                return ProcessorResult::Process;
            };
            processors.insert(event.window, self.registry.create(&window, now));
        }

        let Some(slot) = processors.get_mut(&event.window) else {
            return ProcessorResult::Process;
        };
        let Some(processor) = slot.as_mut() else {
            return ProcessorResult::Process;
        };

        let result = processor.process(event.kind, now);
        if result == ProcessorResult::ProcessAndForget {
            debug!(window = %event.window, "event processor finished");
            *slot = None;
        }
        result
    }

    fn describe(&self, handle: WindowHandle) -> Option<Window> {
        if let Ok(window) = self.store.pick(crate::store::pickers::window_by_handle(handle)) {
            return Some(window);
        }
        self.store.native().window_info(handle).ok().map(Window::from)
    }

    fn translate(&self, event: RawWindowEvent) -> StoreResult<()> {
        let window = event.window;
        let tracked = self.is_tracked(window);

        match event.kind {
            WindowEventKind::Created => Ok(()),
            WindowEventKind::Shown | WindowEventKind::Uncloaked => {
                if tracked {
                    return Ok(());
                }
                self.store.dispatch(WindowAdded::new(window)).map(|_| ())
            }
            WindowEventKind::Foreground => self.store.dispatch(WindowFocused { window: Some(window) }),
            WindowEventKind::MinimizeEnded if !tracked => self.store.dispatch(WindowAdded::new(window)).map(|_| ()),
            _ if !tracked => Ok(()),
            WindowEventKind::Destroyed => self.store.dispatch(WindowRemoved { window }),
            WindowEventKind::Hidden | WindowEventKind::Cloaked => self.store.dispatch(WindowHidden { window }),
            WindowEventKind::MoveSizeStarted => self.store.dispatch(WindowMoveStarted { window }),
            WindowEventKind::LocationChanged => self.store.dispatch(WindowMoved { window }),
            WindowEventKind::MoveSizeEnded => self.store.dispatch(WindowMoveEnded { window }),
            WindowEventKind::MinimizeStarted => self.store.dispatch(WindowMinimizeStarted { window }),
            WindowEventKind::MinimizeEnded => self.store.dispatch(WindowMinimizeEnded { window }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::{GraceWindowConfig, ProcessorsConfig};
    use crate::config::UncaughtErrorPolicy;
    use crate::native::fake::FakeNative;
    use crate::platform::{OwnerHandle, OwnerQueue};
    use crate::store::pickers;
    use crate::store::test_support::store_with;
    use crate::timer::ManualScheduler;

    struct Fixture {
        native: Rc<FakeNative>,
        store: Rc<Store>,
        scheduler: Rc<ManualScheduler>,
        boundary: Rc<PanicBoundary>,
        queue: OwnerQueue,
        listener: WindowEventListener,
    }

    fn fixture(config: &ProcessorsConfig) -> Fixture {
        let native = Rc::new(FakeNative::with_single_monitor());
        let store = Rc::new(store_with(&native, &["a", "b"]));
        let scheduler = Rc::new(ManualScheduler::new());
        let (owner, queue) = OwnerHandle::channel();
        let boundary = Rc::new(PanicBoundary::new(owner, UncaughtErrorPolicy::Log));
        let listener = WindowEventListener::new(
            Rc::clone(&store),
            ProcessorRegistry::from_config(config),
            Rc::clone(&scheduler) as Rc<dyn Scheduler>,
            Rc::clone(&boundary),
        );
        Fixture { native, store, scheduler, boundary, queue, listener }
    }

    fn event(kind: WindowEventKind, handle: isize) -> RawWindowEvent { RawWindowEvent::new(kind, WindowHandle(handle)) }

    impl Fixture {
        fn open(&self, handle: isize, process: &str) {
            self.native.add_window(FakeNative::standard_window(handle, process));
        }

        fn tracked(&self, handle: isize) -> bool { self.listener.is_tracked(WindowHandle(handle)) }
    }

    #[test]
    fn test_shown_and_destroyed() {
        let f = fixture(&ProcessorsConfig::default());
        f.open(10, "app.exe");

        f.listener.handle(event(WindowEventKind::Shown, 10));
        assert!(f.tracked(10));

        f.native.remove_window(WindowHandle(10));
        f.listener.handle(event(WindowEventKind::Destroyed, 10));
        assert!(!f.tracked(10));
    }

    #[test]
    fn test_events_for_unknown_windows_are_dropped() {
        let f = fixture(&ProcessorsConfig::default());
        f.listener.handle(event(WindowEventKind::LocationChanged, 99));
        f.listener.handle(event(WindowEventKind::Destroyed, 99));
        assert!(!f.tracked(99));
    }

    #[test]
    fn test_hidden_window_on_visible_workspace_is_removed() {
        let f = fixture(&ProcessorsConfig::default());
        f.open(10, "app.exe");
        f.listener.handle(event(WindowEventKind::Shown, 10));

        f.listener.handle(event(WindowEventKind::Hidden, 10));
        assert!(!f.tracked(10));
    }

    #[test]
    fn test_foreground_adds_and_focuses() {
        let f = fixture(&ProcessorsConfig::default());
        f.open(10, "app.exe");

        f.listener.handle(event(WindowEventKind::Foreground, 10));
        assert!(f.tracked(10));
        let workspace = f.store.pick(pickers::workspace_by_window(WindowHandle(10))).unwrap();
        assert_eq!(workspace.last_focused_window(), Some(WindowHandle(10)));
    }

    #[test]
    fn test_firefox_is_added_after_first_cloak() {
        let f = fixture(&ProcessorsConfig::default());
        f.open(10, "firefox.exe");

        f.listener.handle(event(WindowEventKind::Shown, 10));
        assert!(!f.tracked(10));
        f.listener.handle(event(WindowEventKind::Cloaked, 10));
        assert!(!f.tracked(10));
        f.listener.handle(event(WindowEventKind::Uncloaked, 10));
        assert!(f.tracked(10));
    }

    #[test]
    fn test_grace_window_relayouts_latest_only() {
        let config = ProcessorsConfig {
            grace_windows: vec![GraceWindowConfig { process_file_names: vec!["teams.exe".to_string()], duration_ms: 3000 }],
        };
        let f = fixture(&config);
        f.open(10, "teams.exe");
        let start = Instant::now();

        f.listener.handle_at(event(WindowEventKind::Shown, 10), start);
        assert!(!f.tracked(10));

        f.listener.handle_at(event(WindowEventKind::LocationChanged, 10), start + Duration::from_millis(100));
        f.listener.handle_at(event(WindowEventKind::LocationChanged, 10), start + Duration::from_millis(200));
        let scheduled = f.scheduler.take();
        assert_eq!(scheduled.len(), 2);
        assert!(scheduled.iter().all(|(delay, _)| *delay == RELAYOUT_DELAY));

        f.listener.relayout(WindowHandle(10), 1);
        assert!(!f.tracked(10));
        f.listener.relayout(WindowHandle(10), 2);
        assert!(f.tracked(10));
    }

    #[test]
    fn test_grace_ends_with_first_late_event() {
        let config = ProcessorsConfig {
            grace_windows: vec![GraceWindowConfig { process_file_names: vec!["teams.exe".to_string()], duration_ms: 500 }],
        };
        let f = fixture(&config);
        f.open(10, "teams.exe");
        let start = Instant::now();

        f.listener.handle_at(event(WindowEventKind::Shown, 10), start);
        f.listener.handle_at(event(WindowEventKind::Foreground, 10), start + Duration::from_secs(1));
        assert!(f.tracked(10));
        assert!(f.scheduler.take().is_empty());
    }

    #[test]
    fn test_only_latest_monitor_rescan_runs() {
        let f = fixture(&ProcessorsConfig::default());
        f.listener.display_changed();
        f.listener.display_changed();

        let scheduled = f.scheduler.take();
        assert_eq!(
            scheduled,
            vec![
                (MONITOR_RESCAN_DELAY, OwnerMessage::RescanMonitors { generation: 1 }),
                (MONITOR_RESCAN_DELAY, OwnerMessage::RescanMonitors { generation: 2 }),
            ]
        );

        f.native.set_monitors(vec![FakeNative::monitor(1, 0.0, 0.0, true), FakeNative::monitor(2, 1920.0, 0.0, false)]);
        f.listener.rescan_monitors(1);
        assert_eq!(f.store.pick(pickers::all_monitors).len(), 1);
        f.listener.rescan_monitors(2);
        assert_eq!(f.store.pick(pickers::all_monitors).len(), 2);
    }

    #[test]
    fn test_panic_in_event_is_contained() {
        let mut f = fixture(&ProcessorsConfig::default());
        f.open(10, "app.exe");
        f.native.panic_on_window_info(WindowHandle(10));

        f.listener.handle(event(WindowEventKind::Shown, 10));
        assert!(!f.tracked(10));
        assert!(f.queue.drain().is_empty());

        f.open(11, "app.exe");
        f.listener.handle(event(WindowEventKind::Shown, 11));
        assert!(f.tracked(11));
    }

    #[test]
    fn test_panic_in_event_with_shutdown_policy_requests_exit() {
        let mut f = fixture(&ProcessorsConfig::default());
        f.boundary.set_policy(UncaughtErrorPolicy::Shutdown);
        f.open(10, "app.exe");
        f.native.panic_on_window_info(WindowHandle(10));

        f.listener.handle(event(WindowEventKind::Shown, 10));
        assert_eq!(f.queue.drain(), vec![OwnerMessage::Shutdown]);
    }
}
