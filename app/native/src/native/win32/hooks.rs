//! OS hooks and the owner message loop.
//!
//! Window events, low-level keyboard events and display notifications are all
//! delivered to the thread that installed them while it pumps messages. That
//! thread owns the [`Context`]; callbacks reach it through a thread-local
//! [`Dispatcher`], which also queues input that arrives while the store is busy.
//! Every callback runs its work inside the context's panic boundary, since a
//! panic must not unwind across an `extern "system"` frame.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::rc::Rc;

use tracing::{debug, info, warn};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Accessibility::{HWINEVENTHOOK, SetWinEventHook, UnhookWinEvent};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, HC_ACTION, HHOOK,
    KBDLLHOOKSTRUCT, MSG, PM_NOREMOVE, PeekMessageW, PostThreadMessageW, RegisterClassW, SPI_SETWORKAREA,
    SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, WH_KEYBOARD_LL, WINDOW_EX_STYLE, WINDOW_STYLE,
    WINEVENT_OUTOFCONTEXT, WINEVENT_SKIPOWNPROCESS, WM_APP, WM_DISPLAYCHANGE, WM_KEYDOWN, WM_SETTINGCHANGE,
    WM_SYSKEYDOWN, WNDCLASSW,
};
use windows::core::w;

use super::Win32Native;
use crate::config::{self, TesseraConfig};
use crate::context::Context;
use crate::error::TesseraResult;
use crate::listener::RawWindowEvent;
use crate::listener::event::HOOKED_RANGES;
use crate::native::NativeError;
use crate::platform::{OwnerHandle, OwnerQueue};
use crate::timer::Timer;

/// Thread message telling the loop that the owner queue has work.
const WM_OWNER_QUEUE: u32 = WM_APP + 1;

thread_local! {
    static DISPATCHER: RefCell<Option<Rc<Dispatcher>>> = const { RefCell::new(None) };
}

/// Runs `f` against the installed dispatcher. `None` when none is installed or
/// `f` panicked.
fn with_dispatcher<T>(origin: &str, f: impl FnOnce(&Dispatcher) -> T) -> Option<T> {
    let dispatcher = DISPATCHER.with(|slot| slot.try_borrow().ok().and_then(|slot| slot.clone()))?;
    dispatcher.ctx.boundary().run(origin, || f(&dispatcher))
}

enum Input {
    Window(RawWindowEvent),
    DisplayChanged,
}

/// Clears the busy flag when a dispatch ends, including by panic.
struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) { self.0.set(false); }
}

struct Dispatcher {
    ctx: Context,
    busy: Cell<bool>,
    pending: RefCell<VecDeque<Input>>,
}

impl Dispatcher {
    fn new(ctx: Context) -> Self { Self { ctx, busy: Cell::new(false), pending: RefCell::new(VecDeque::new()) } }

    fn submit(&self, input: Input) {
        self.pending.borrow_mut().push_back(input);
        self.drain_pending();
    }

    fn drain_pending(&self) {
        if self.busy.replace(true) {
            return;
        }
        let _guard = BusyGuard(&self.busy);

        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(Input::Window(event)) => self.ctx.listener().handle(event),
                Some(Input::DisplayChanged) => self.ctx.listener().display_changed(),
                None => break,
            }
        }
    }

    /// Keys cannot wait: while the store is busy they pass through.
    fn key_down(&self, key: u8) -> bool {
        if self.busy.replace(true) {
            debug!(key, "store busy, key passed through");
            return false;
        }
        let handled = {
            let _guard = BusyGuard(&self.busy);
            self.ctx.keybinds().handle_key_down(key)
        };
        self.drain_pending();
        handled
    }

    fn owner_messages(&self, queue: &mut OwnerQueue) -> ControlFlow<()> {
        for message in queue.drain() {
            let flow = {
                self.busy.set(true);
                let _guard = BusyGuard(&self.busy);
                self.ctx.handle_message(message)
            };
            if flow.is_break() {
                return flow;
            }
        }
        self.drain_pending();
        ControlFlow::Continue(())
    }
}

/// Window event hook callback.
///
/// # Safety
///
/// Called by the OS on the installing thread while it pumps messages.
unsafe extern "system" fn win_event_proc(
    _hook: HWINEVENTHOOK,
    event: u32,
    hwnd: HWND,
    id_object: i32,
    id_child: i32,
    _thread: u32,
    _time: u32,
) {
    if let Some(event) = RawWindowEvent::from_hook(event, hwnd.0 as isize, id_object, id_child) {
        with_dispatcher("window event hook", |dispatcher| dispatcher.submit(Input::Window(event)));
    }
}

/// Low-level keyboard hook callback. Returning non-zero swallows the key.
///
/// # Safety
///
/// Called by the OS on the installing thread. `l_param` points to a
/// `KBDLLHOOKSTRUCT` when `n_code` is `HC_ACTION`.
unsafe extern "system" fn keyboard_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    #[allow(clippy::cast_possible_wrap)]
    let is_action = n_code == HC_ACTION as i32;
    let is_key_down = matches!(u32::try_from(w_param.0), Ok(WM_KEYDOWN | WM_SYSKEYDOWN));

    if is_action && is_key_down {
        // SAFETY: see above.
        let info = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };
        #[allow(clippy::cast_possible_truncation)]
        let key = info.vkCode as u8;
        if with_dispatcher("keyboard hook", |dispatcher| dispatcher.key_down(key)).unwrap_or(false) {
            return LRESULT(1);
        }
    }

    // SAFETY: forwarding to the next hook in the chain.
    unsafe { CallNextHookEx(None, n_code, w_param, l_param) }
}

/// Window procedure of the hidden notification window.
///
/// # Safety
///
/// Called by the OS for messages sent to that window.
unsafe extern "system" fn notification_proc(hwnd: HWND, message: u32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    let is_work_area = message == WM_SETTINGCHANGE && w_param.0 == SPI_SETWORKAREA.0 as usize;
    if message == WM_DISPLAYCHANGE || is_work_area {
        debug!(message, "display configuration changed");
        with_dispatcher("display notification", |dispatcher| dispatcher.submit(Input::DisplayChanged));
        return LRESULT(0);
    }
    // SAFETY: default handling for everything else.
    unsafe { DefWindowProcW(hwnd, message, w_param, l_param) }
}

/// Installed hooks, removed on drop.
struct Hooks {
    win_events: Vec<HWINEVENTHOOK>,
    keyboard: HHOOK,
}

impl Hooks {
    fn install() -> Result<Self, NativeError> {
        let mut win_events = Vec::with_capacity(HOOKED_RANGES.len());
        for (min, max) in HOOKED_RANGES {
            // SAFETY: the callback is a plain function that lives for the process.
            let hook = unsafe {
                SetWinEventHook(
                    min,
                    max,
                    None,
                    Some(win_event_proc),
                    0,
                    0,
                    WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS,
                )
            };
            if hook.is_invalid() {
                for installed in win_events {
                    // SAFETY: unhooking a hook this function installed.
                    let _ = unsafe { UnhookWinEvent(installed) };
                }
                return Err(NativeError::HookInstall {
                    hook: "window event",
                    message: format!("SetWinEventHook({min:#x}, {max:#x}) returned null"),
                });
            }
            win_events.push(hook);
        }

        // SAFETY: as above; the thread pumps messages right after installation.
        let keyboard = unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), None, 0) }.map_err(|err| {
            NativeError::HookInstall { hook: "keyboard", message: err.message() }
        });
        let keyboard = match keyboard {
            Ok(keyboard) => keyboard,
            Err(err) => {
                drop(Self { win_events, keyboard: HHOOK::default() });
                return Err(err);
            }
        };

        info!(window_event_hooks = win_events.len(), "hooks installed");
        Ok(Self { win_events, keyboard })
    }
}

impl Drop for Hooks {
    fn drop(&mut self) {
        for hook in self.win_events.drain(..) {
            // SAFETY: each hook was returned by SetWinEventHook.
            let _ = unsafe { UnhookWinEvent(hook) };
        }
        if !self.keyboard.is_invalid() {
            // SAFETY: returned by SetWindowsHookExW.
            let _ = unsafe { UnhookWindowsHookEx(self.keyboard) };
        }
        debug!("hooks removed");
    }
}

/// A hidden top-level window. Only top-level windows receive display broadcasts.
struct NotificationWindow(HWND);

impl NotificationWindow {
    fn create() -> Result<Self, NativeError> {
        let call = |function: &'static str| move |err: windows::core::Error| super::call_error(function, &err);

        // SAFETY: the class and window are registered and created on this thread
        // with static strings and a plain window procedure.
        unsafe {
            let instance = GetModuleHandleW(None).map_err(call("GetModuleHandleW"))?;
            let class = WNDCLASSW {
                lpfnWndProc: Some(notification_proc),
                hInstance: instance.into(),
                lpszClassName: w!("TesseraNotifications"),
                ..Default::default()
            };
            if RegisterClassW(&raw const class) == 0 {
                return Err(super::call_error("RegisterClassW", &windows::core::Error::from_thread()));
            }

            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE(0),
                w!("TesseraNotifications"),
                w!("Tessera"),
                WINDOW_STYLE(0),
                0,
                0,
                0,
                0,
                None,
                None,
                Some(instance.into()),
                None,
            )
            .map_err(call("CreateWindowExW"))?;
            Ok(Self(hwnd))
        }
    }
}

impl Drop for NotificationWindow {
    fn drop(&mut self) {
        // SAFETY: the window was created on this thread.
        let _ = unsafe { DestroyWindow(self.0) };
    }
}

/// Runs the manager on the calling thread until shutdown or `WM_QUIT`.
///
/// # Errors
///
/// Returns an error when the hooks cannot be installed or the store cannot be
/// initialized. Both end the process.
pub fn run(config: &TesseraConfig) -> TesseraResult<()> {
    let mut msg = MSG::default();
    // SAFETY: forces creation of this thread's message queue so that posts made
    // before the loop starts are not lost.
    let (thread_id, _) = unsafe { (GetCurrentThreadId(), PeekMessageW(&raw mut msg, None, 0, 0, PM_NOREMOVE)) };

    let (owner, mut queue) = OwnerHandle::channel();
    let owner = owner.with_waker(move || {
        // SAFETY: posting to a thread id has no memory preconditions.
        let _ = unsafe { PostThreadMessageW(thread_id, WM_OWNER_QUEUE, WPARAM(0), LPARAM(0)) };
    });

    let timer = Rc::new(Timer::start(owner.clone())?);
    config::watch_config_file(owner.clone());

    let ctx = Context::new(config, Rc::new(Win32Native::new()), owner, timer)?;
    let dispatcher = Rc::new(Dispatcher::new(ctx));
    DISPATCHER.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&dispatcher)));

    let result = pump(&dispatcher, &mut queue, &mut msg);

    DISPATCHER.with(|slot| slot.borrow_mut().take());
    if let Err(err) = dispatcher.ctx.shutdown() {
        warn!(error = %err, "failed to save state");
    }
    info!("tessera stopped");
    result
}

fn pump(dispatcher: &Dispatcher, queue: &mut OwnerQueue, msg: &mut MSG) -> TesseraResult<()> {
    let _hooks = Hooks::install()?;
    let _notifications = NotificationWindow::create()?;

    loop {
        // SAFETY: standard GetMessage/DispatchMessage loop.
        let status = unsafe { GetMessageW(msg, None, 0, 0) };
        match status.0 {
            0 => return Ok(()),
            -1 => return Err(super::call_error("GetMessageW", &windows::core::Error::from_thread()).into()),
            _ => {}
        }

        if msg.hwnd.is_invalid() && msg.message == WM_OWNER_QUEUE {
            if dispatcher.owner_messages(queue).is_break() {
                return Ok(());
            }
            continue;
        }

        // SAFETY: `msg` was filled by GetMessageW.
        unsafe {
            let _ = TranslateMessage(msg);
            DispatchMessageW(msg);
        }
    }
}
