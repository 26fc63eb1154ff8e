//! End-to-end tests of the window manager against the in-memory desktop.
//!
//! Each test builds a full [`Context`] from a configuration, then drives it the way
//! the hooks do: raw window events into the listener, key presses into the keybind
//! hook and delayed work through the owner queue.

use std::ops::ControlFlow;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use tessera_lib::config::{KeybindingCommands, RouteRule, TesseraConfig, WindowRule, WorkspaceConfig};
use tessera_lib::context::Context;
use tessera_lib::geometry::Rect;
use tessera_lib::listener::{RawWindowEvent, WindowEventKind};
use tessera_lib::native::fake::FakeNative;
use tessera_lib::native::{NativeApi, WindowHandle};
use tessera_lib::platform::{OwnerHandle, OwnerQueue};
use tessera_lib::store::pickers;
use tessera_lib::timer::{ManualScheduler, Scheduler};

const VK_LWIN: u8 = 0x5B;
const VK_LSHIFT: u8 = 0xA0;

// ============================================================================
// Helpers
// ============================================================================

struct Desktop {
    native: Rc<FakeNative>,
    scheduler: Rc<ManualScheduler>,
    queue: OwnerQueue,
    ctx: Context,
    _state_dir: tempfile::TempDir,
}

/// A configuration with two named workspaces and a private state directory.
fn config(state_dir: &tempfile::TempDir) -> TesseraConfig {
    TesseraConfig {
        workspaces: vec![
            WorkspaceConfig { name: "Code".to_string(), layout_engines: None },
            WorkspaceConfig { name: "Chat".to_string(), layout_engines: None },
        ],
        saved_state_dir: Some(state_dir.path().display().to_string()),
        ..TesseraConfig::default()
    }
}

fn desktop(native: FakeNative, configure: impl FnOnce(&mut TesseraConfig)) -> Desktop {
    let state_dir = tempfile::tempdir().unwrap();
    let mut config = config(&state_dir);
    configure(&mut config);

    let native = Rc::new(native);
    let scheduler = Rc::new(ManualScheduler::new());
    let (owner, queue) = OwnerHandle::channel();
    let ctx = Context::new(
        &config,
        Rc::clone(&native) as Rc<dyn NativeApi>,
        owner,
        Rc::clone(&scheduler) as Rc<dyn Scheduler>,
    )
    .unwrap();

    Desktop { native, scheduler, queue, ctx, _state_dir: state_dir }
}

impl Desktop {
    fn open(&self, handle: isize, process: &str) {
        self.native.add_window(FakeNative::standard_window(handle, process));
        self.event(WindowEventKind::Shown, handle);
    }

    fn event(&self, kind: WindowEventKind, handle: isize) {
        self.ctx.listener().handle(RawWindowEvent::new(kind, WindowHandle(handle)));
    }

    /// Delivers every scheduled message, then everything posted to the owner queue.
    fn run_pending(&mut self) -> ControlFlow<()> {
        for (_, message) in self.scheduler.take() {
            self.ctx.handle_message(message)?;
        }
        for message in self.queue.drain() {
            self.ctx.handle_message(message)?;
        }
        ControlFlow::Continue(())
    }

    fn workspace_of(&self, handle: isize) -> String {
        self.ctx.butler().workspace_for_window(WindowHandle(handle)).unwrap().name.clone()
    }

    fn active_workspace(&self) -> String {
        self.ctx.store().pick(pickers::active_workspace).unwrap().name.clone()
    }

    fn rect_of(&self, handle: isize) -> Rect { self.native.last_position(WindowHandle(handle)).unwrap().rect }
}

// ============================================================================
// Startup
// ============================================================================

#[test]
fn test_existing_windows_are_adopted_and_tiled() {
    let native = FakeNative::with_single_monitor();
    native.add_window(FakeNative::standard_window(1, "code.exe"));
    native.add_window(FakeNative::standard_window(2, "terminal.exe"));

    let d = desktop(native, |_| {});

    assert_eq!(d.workspace_of(1), "Code");
    assert_eq!(d.workspace_of(2), "Code");
    assert_eq!(d.rect_of(1), Rect::new(0.0, 0.0, 960.0, 1040.0));
    assert_eq!(d.rect_of(2), Rect::new(960.0, 0.0, 960.0, 1040.0));
}

#[test]
fn test_every_monitor_gets_a_workspace() {
    let d = desktop(FakeNative::with_two_monitors(), |config| config.workspaces.clear());

    assert_eq!(d.ctx.store().pick(pickers::all_active_workspaces).len(), 2);
}

// ============================================================================
// Window events
// ============================================================================

#[test]
fn test_new_window_joins_the_active_workspace() {
    let d = desktop(FakeNative::with_single_monitor(), |_| {});

    d.open(10, "notepad.exe");

    assert_eq!(d.workspace_of(10), "Code");
    assert_eq!(d.rect_of(10), Rect::new(0.0, 0.0, 1920.0, 1040.0));
}

#[test]
fn test_routed_window_lands_on_hidden_workspace() {
    let d = desktop(FakeNative::with_single_monitor(), |config| {
        config.routes.push(RouteRule { rule: WindowRule::process("slack.exe"), workspace: "Chat".to_string() });
    });

    d.open(20, "slack.exe");

    assert_eq!(d.workspace_of(20), "Chat");
    assert_eq!(d.active_workspace(), "Code");
    assert!(d.native.hidden_windows().contains(&WindowHandle(20)));
}

#[test]
fn test_filtered_window_is_not_tracked() {
    let d = desktop(FakeNative::with_single_monitor(), |config| {
        config.filters.push(WindowRule::process("overlay.exe"));
    });

    d.open(30, "overlay.exe");

    assert!(d.ctx.butler().workspace_for_window(WindowHandle(30)).is_err());
}

#[test]
fn test_destroyed_window_gives_back_its_space() {
    let d = desktop(FakeNative::with_single_monitor(), |_| {});
    d.open(1, "code.exe");
    d.open(2, "terminal.exe");

    d.native.remove_window(WindowHandle(2));
    d.event(WindowEventKind::Destroyed, 2);

    assert!(d.ctx.butler().workspace_for_window(WindowHandle(2)).is_err());
    assert_eq!(d.rect_of(1), Rect::new(0.0, 0.0, 1920.0, 1040.0));
}

#[test]
fn test_monitor_added_after_display_change() {
    let mut d = desktop(FakeNative::with_single_monitor(), |_| {});
    assert_eq!(d.ctx.store().pick(pickers::all_active_workspaces).len(), 1);

    d.native.set_monitors(vec![
        FakeNative::monitor(1, 0.0, 0.0, true),
        FakeNative::monitor(2, 1920.0, 0.0, false),
    ]);
    d.ctx.listener().display_changed();
    d.ctx.listener().display_changed();
    assert_eq!(d.run_pending(), ControlFlow::Continue(()));

    let active: Vec<_> =
        d.ctx.store().pick(pickers::all_active_workspaces).iter().map(|ws| ws.name.clone()).collect();
    assert_eq!(active.len(), 2);
    assert!(active.contains(&"Chat".to_string()));
}

// ============================================================================
// Keybindings
// ============================================================================

fn bind(config: &mut TesseraConfig, chord: &str, command: &str) {
    config.keybindings.insert(chord.to_string(), KeybindingCommands::Single(command.to_string()));
}

#[test]
fn test_keybinding_switches_workspace() {
    let d = desktop(FakeNative::with_single_monitor(), |config| {
        bind(config, "Win+2", "tessera.core.activate_workspace_2");
    });
    d.open(1, "code.exe");

    d.native.press_key(VK_LWIN);
    assert!(d.ctx.keybinds().handle_key_down(b'2'));

    assert_eq!(d.active_workspace(), "Chat");
    assert!(d.native.hidden_windows().contains(&WindowHandle(1)));
}

#[test]
fn test_keybinding_moves_window_to_workspace() {
    let d = desktop(FakeNative::with_single_monitor(), |config| {
        bind(config, "Win+Shift+2", "tessera.core.move_window_to_workspace_2");
    });
    d.open(1, "code.exe");
    d.native.set_foreground(Some(WindowHandle(1)));
    d.event(WindowEventKind::Foreground, 1);

    d.native.press_key(VK_LWIN);
    d.native.press_key(VK_LSHIFT);
    assert!(d.ctx.keybinds().handle_key_down(b'2'));

    assert_eq!(d.workspace_of(1), "Chat");
    assert_eq!(d.active_workspace(), "Code");
}

#[test]
fn test_exit_keybinding_stops_the_loop() {
    let mut d = desktop(FakeNative::with_single_monitor(), |config| bind(config, "Win+Q", "tessera.core.exit"));

    d.native.press_key(VK_LWIN);
    assert!(d.ctx.keybinds().handle_key_down(b'Q'));

    assert_eq!(d.run_pending(), ControlFlow::Break(()));
}

#[test]
fn test_unbound_keys_pass_through() {
    let mut d = desktop(FakeNative::with_single_monitor(), |config| bind(config, "Win+Q", "tessera.core.exit"));

    assert!(!d.ctx.keybinds().handle_key_down(b'Q'));
    assert!(d.queue.drain().is_empty());
}

// ============================================================================
// Saved state
// ============================================================================

#[test]
fn test_shutdown_then_restart_keeps_placement() {
    let state_dir = tempfile::tempdir().unwrap();
    let config = config(&state_dir);
    let native = Rc::new(FakeNative::with_single_monitor());
    native.add_window(FakeNative::standard_window(1, "code.exe"));
    native.add_window(FakeNative::standard_window(2, "slack.exe"));

    let start = |native: &Rc<FakeNative>| {
        let (owner, _queue) = OwnerHandle::channel();
        Context::new(&config, Rc::clone(native) as Rc<dyn NativeApi>, owner, Rc::new(ManualScheduler::new())).unwrap()
    };

    let first = start(&native);
    let chat = first.store().pick(pickers::workspace_by_name("Chat")).unwrap().id;
    first.butler().move_window_to_workspace(chat, Some(WindowHandle(2))).unwrap();
    first.shutdown().unwrap();
    drop(first);

    let second = start(&native);
    assert_eq!(second.butler().workspace_for_window(WindowHandle(1)).unwrap().name, "Code");
    assert_eq!(second.butler().workspace_for_window(WindowHandle(2)).unwrap().name, "Chat");
}
