//! The Win32 backend.
//!
//! [`Win32Native`] implements [`NativeApi`] over the `windows` crate. The hooks and
//! the owner message loop live in [`hooks`].
//!
//! # Safety
//!
//! `unsafe` is limited to FFI calls. Every block carries a `// SAFETY:` note.

mod hooks;

use std::ffi::c_void;
use std::mem::size_of;
use std::path::Path;

use windows::Win32::Foundation::{CloseHandle, HWND, LPARAM, POINT, RECT};
use windows::Win32::Graphics::Dwm::{DWMWA_CLOAKED, DWMWA_EXTENDED_FRAME_BOUNDS, DwmGetWindowAttribute};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITOR_DEFAULTTONEAREST, MONITORINFOEXW, MonitorFromPoint,
    MonitorFromWindow,
};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION, QueryFullProcessImageNameW,
};
use windows::Win32::UI::HiDpi::{GetDpiForMonitor, MDT_EFFECTIVE_DPI};
use windows::Win32::UI::Input::KeyboardAndMouse::GetKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    BeginDeferWindowPos, DeferWindowPos, EndDeferWindowPos, EnumWindows, FindWindowW, GA_ROOT, GW_OWNER,
    GWL_EXSTYLE, GWL_STYLE, GetAncestor, GetClassNameW, GetCursorPos, GetDesktopWindow, GetForegroundWindow,
    GetShellWindow, GetWindow, GetWindowLongPtrW, GetWindowRect, GetWindowTextW, GetWindowThreadProcessId, IsIconic,
    IsWindow, IsWindowVisible, IsZoomed, SW_HIDE, SW_SHOWMAXIMIZED, SW_SHOWMINNOACTIVE, SW_SHOWNOACTIVATE,
    SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOCOPYBITS, SWP_NOOWNERZORDER, SWP_NOZORDER, SetForegroundWindow,
    ShowWindow, WS_CHILD, WS_DISABLED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_MAXIMIZEBOX, WS_MINIMIZEBOX, WS_POPUP,
    WS_THICKFRAME,
};
use windows::core::{BOOL, PWSTR, w};

pub use self::hooks::run;
use super::{
    KeyboardState, MonitorHandle, MonitorInfo, NativeApi, NativeError, WindowHandle, WindowInfo, WindowPosition,
    WindowSize,
};
use crate::geometry::{Point, Rect};
use crate::keybind::Modifiers;

const SPLASH_CLASS_NAME: &str = "MsoSplash";
const SYSTEM_CLASS_NAMES: [&str; 5] = ["SysListView32", "WorkerW", "Shell_TrayWnd", "Shell_SecondaryTrayWnd", "Progman"];
const MONITORINFOF_PRIMARY: u32 = 1;
const DEFAULT_DPI: u32 = 96;
const TEXT_CAPACITY: usize = 256;

fn hwnd(window: WindowHandle) -> HWND { HWND(window.0 as *mut c_void) }

fn window_handle(hwnd: HWND) -> WindowHandle { WindowHandle(hwnd.0 as isize) }

fn monitor_handle(monitor: HMONITOR) -> Option<MonitorHandle> {
    (!monitor.is_invalid()).then(|| MonitorHandle(monitor.0 as isize))
}

fn to_rect(rect: &RECT) -> Rect {
    Rect::new(
        f64::from(rect.left),
        f64::from(rect.top),
        f64::from(rect.right - rect.left),
        f64::from(rect.bottom - rect.top),
    )
}

fn call_error(function: &'static str, err: &windows::core::Error) -> NativeError {
    NativeError::Call { function, message: err.message() }
}

fn read_text(read: impl FnOnce(&mut [u16]) -> i32) -> String {
    let mut buffer = [0u16; TEXT_CAPACITY];
    let len = usize::try_from(read(&mut buffer)).unwrap_or(0).min(TEXT_CAPACITY);
    String::from_utf16_lossy(&buffer[..len])
}

/// The real window system.
#[derive(Debug, Default)]
pub struct Win32Native;

impl Win32Native {
    #[must_use]
    pub const fn new() -> Self { Self }

    fn class_name(window: HWND) -> String {
        // SAFETY: the buffer outlives the call and its length is passed along.
        read_text(|buffer| unsafe { GetClassNameW(window, buffer) })
    }

    fn title(window: HWND) -> String {
        // SAFETY: as above.
        read_text(|buffer| unsafe { GetWindowTextW(window, buffer) })
    }

    fn process_file_name(process_id: u32) -> Option<String> {
        // SAFETY: the process handle is closed before returning and the buffer
        // outlives the query.
        unsafe {
            let process = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, process_id).ok()?;
            let mut buffer = [0u16; 1024];
            let mut len = buffer.len() as u32;
            let result =
                QueryFullProcessImageNameW(process, PROCESS_NAME_WIN32, PWSTR(buffer.as_mut_ptr()), &raw mut len);
            let _ = CloseHandle(process);
            result.ok()?;

            let path = String::from_utf16_lossy(&buffer[..len as usize]);
            Path::new(&path).file_name().map(|name| name.to_string_lossy().into_owned())
        }
    }

    fn is_cloaked(window: HWND) -> bool {
        let mut cloaked = 0u32;
        // SAFETY: `cloaked` is a u32, the size DWMWA_CLOAKED writes.
        let result = unsafe {
            DwmGetWindowAttribute(window, DWMWA_CLOAKED, (&raw mut cloaked).cast::<c_void>(), size_of::<u32>() as u32)
        };
        result.is_ok() && cloaked != 0
    }

    fn styles(window: HWND) -> (u32, u32) {
        // SAFETY: reading window longs has no preconditions beyond a handle.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        unsafe {
            (GetWindowLongPtrW(window, GWL_STYLE) as u32, GetWindowLongPtrW(window, GWL_EXSTYLE) as u32)
        }
    }

    /// A root, visible window with a frame or caption buttons, which is neither a
    /// tool window nor a shell surface.
    fn is_standard(window: HWND, class_name: &str) -> bool {
        // SAFETY: plain queries on a window handle.
        let (is_root, is_visible, is_system) = unsafe {
            (
                GetAncestor(window, GA_ROOT) == window,
                IsWindowVisible(window).as_bool(),
                window == GetDesktopWindow() || window == GetShellWindow(),
            )
        };
        if !is_root || !is_visible || is_system || SYSTEM_CLASS_NAMES.contains(&class_name) {
            return false;
        }

        let (style, ex_style) = Self::styles(window);
        let has = |bits: u32, flag: u32| bits & flag == flag;
        let uninteresting_popup = has(style, WS_POPUP.0)
            && style & (WS_THICKFRAME.0 | WS_MINIMIZEBOX.0 | WS_MAXIMIZEBOX.0) == 0;

        !(uninteresting_popup
            || has(style, WS_CHILD.0)
            || has(style, WS_DISABLED.0)
            || has(ex_style, WS_EX_TOOLWINDOW.0)
            || has(ex_style, WS_EX_NOACTIVATE.0))
    }

    fn has_visible_owner(window: HWND) -> bool {
        // SAFETY: plain queries on window handles.
        unsafe {
            let Ok(owner) = GetWindow(window, GW_OWNER) else {
                return false;
            };
            if owner.is_invalid() || !IsWindowVisible(owner).as_bool() {
                return false;
            }
            let mut rect = RECT::default();
            if GetWindowRect(owner, &raw mut rect).is_err() {
                return true;
            }
            rect.right > rect.left && rect.bottom > rect.top
        }
    }

    fn extended_frame(window: HWND) -> Option<RECT> {
        let mut frame = RECT::default();
        // SAFETY: `frame` is a RECT, the size DWMWA_EXTENDED_FRAME_BOUNDS writes.
        unsafe {
            DwmGetWindowAttribute(
                window,
                DWMWA_EXTENDED_FRAME_BOUNDS,
                (&raw mut frame).cast::<c_void>(),
                size_of::<RECT>() as u32,
            )
        }
        .ok()?;
        Some(frame)
    }
}

/// Win32 monitor enumeration callback.
///
/// # Safety
///
/// `lparam` must point to a live `Vec<MonitorInfo>` for the duration of the
/// enumeration.
unsafe extern "system" fn monitor_enum_proc(monitor: HMONITOR, _hdc: HDC, _clip: *mut RECT, lparam: LPARAM) -> BOOL {
    // SAFETY: guaranteed by the caller of EnumDisplayMonitors.
    let monitors = unsafe { &mut *(lparam.0 as *mut Vec<MonitorInfo>) };

    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = size_of::<MONITORINFOEXW>() as u32;

    // SAFETY: `info` is a MONITORINFOEXW with its size set.
    if !unsafe { GetMonitorInfoW(monitor, (&raw mut info).cast()) }.as_bool() {
        return BOOL(1);
    }

    let (mut dpi_x, mut dpi_y) = (DEFAULT_DPI, DEFAULT_DPI);
    // SAFETY: both out pointers are live locals.
    if unsafe { GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &raw mut dpi_x, &raw mut dpi_y) }.is_err() {
        dpi_x = DEFAULT_DPI;
    }

    let name_len = info.szDevice.iter().position(|c| *c == 0).unwrap_or(info.szDevice.len());
    monitors.push(MonitorInfo {
        handle: MonitorHandle(monitor.0 as isize),
        device_name: String::from_utf16_lossy(&info.szDevice[..name_len]),
        bounds: to_rect(&info.monitorInfo.rcMonitor),
        working_area: to_rect(&info.monitorInfo.rcWork),
        scale_factor: dpi_x * 100 / DEFAULT_DPI,
        is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
    });
    BOOL(1)
}

/// Top-level window enumeration callback.
///
/// # Safety
///
/// `lparam` must point to a live `Vec<WindowHandle>`.
unsafe extern "system" fn window_enum_proc(window: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: guaranteed by the caller of EnumWindows.
    let windows = unsafe { &mut *(lparam.0 as *mut Vec<WindowHandle>) };
    windows.push(window_handle(window));
    BOOL(1)
}

impl NativeApi for Win32Native {
    fn enumerate_monitors(&self) -> Result<Vec<MonitorInfo>, NativeError> {
        let mut monitors: Vec<MonitorInfo> = Vec::new();

        // SAFETY: `monitors` outlives the synchronous enumeration.
        unsafe {
            let _ = EnumDisplayMonitors(None, None, Some(monitor_enum_proc), LPARAM((&raw mut monitors) as isize));
        }

        if monitors.is_empty() {
            return Err(NativeError::NoMonitors);
        }
        Ok(monitors)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn monitor_from_point(&self, point: Point) -> Option<MonitorHandle> {
        let point = POINT { x: point.x.round() as i32, y: point.y.round() as i32 };
        // SAFETY: no preconditions.
        monitor_handle(unsafe { MonitorFromPoint(point, MONITOR_DEFAULTTONEAREST) })
    }

    fn monitor_from_window(&self, window: WindowHandle) -> Option<MonitorHandle> {
        // SAFETY: an invalid handle yields the nearest monitor or null.
        monitor_handle(unsafe { MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST) })
    }

    fn window_info(&self, window: WindowHandle) -> Result<WindowInfo, NativeError> {
        if !self.is_window(window) {
            return Err(NativeError::WindowGone(window));
        }

        let handle = hwnd(window);
        let class_name = Self::class_name(handle);
        let mut process_id = 0u32;
        // SAFETY: `process_id` is a live local.
        unsafe { GetWindowThreadProcessId(handle, Some(&raw mut process_id)) };

        // SAFETY: plain queries on a window handle.
        let (is_minimized, is_maximized, is_visible) = unsafe {
            (IsIconic(handle).as_bool(), IsZoomed(handle).as_bool(), IsWindowVisible(handle).as_bool())
        };

        Ok(WindowInfo {
            handle: window,
            title: Self::title(handle),
            is_splash_screen: class_name == SPLASH_CLASS_NAME,
            is_standard: Self::is_standard(handle, &class_name),
            class_name,
            process_id,
            process_file_name: Self::process_file_name(process_id),
            is_minimized,
            is_maximized,
            is_visible,
            is_cloaked: Self::is_cloaked(handle),
            has_visible_owner: Self::has_visible_owner(handle),
        })
    }

    fn top_level_windows(&self) -> Vec<WindowHandle> {
        let mut windows: Vec<WindowHandle> = Vec::new();
        // SAFETY: `windows` outlives the synchronous enumeration.
        if let Err(err) = unsafe { EnumWindows(Some(window_enum_proc), LPARAM((&raw mut windows) as isize)) } {
            tracing::warn!(error = %err, "failed to enumerate windows");
        }
        windows
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        // SAFETY: IsWindow accepts any handle.
        !window.is_null() && unsafe { IsWindow(Some(hwnd(window))) }.as_bool()
    }

    fn window_rect(&self, window: WindowHandle) -> Option<Rect> {
        Self::extended_frame(hwnd(window)).map(|frame| to_rect(&frame))
    }

    fn window_offset(&self, window: WindowHandle) -> Option<Rect> {
        let handle = hwnd(window);
        let mut outer = RECT::default();
        // SAFETY: `outer` is a live local.
        unsafe { GetWindowRect(handle, &raw mut outer) }.ok()?;
        let frame = Self::extended_frame(handle)?;

        Some(Rect::new(
            f64::from(outer.left - frame.left),
            f64::from(outer.top - frame.top),
            f64::from((outer.right - outer.left) - (frame.right - frame.left)),
            f64::from((outer.bottom - outer.top) - (frame.bottom - frame.top)),
        ))
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        // SAFETY: no preconditions.
        let window = window_handle(unsafe { GetForegroundWindow() });
        (!window.is_null()).then_some(window)
    }

    fn cursor_position(&self) -> Option<Point> {
        let mut point = POINT::default();
        // SAFETY: `point` is a live local.
        unsafe { GetCursorPos(&raw mut point) }.ok()?;
        Some(Point::new(f64::from(point.x), f64::from(point.y)))
    }

    fn focus_window(&self, window: WindowHandle) {
        // SAFETY: plain call on a window handle.
        if !unsafe { SetForegroundWindow(hwnd(window)) }.as_bool() {
            tracing::debug!(%window, "SetForegroundWindow was refused");
        }
    }

    fn hide_window(&self, window: WindowHandle) {
        // SAFETY: plain call on a window handle.
        let _ = unsafe { ShowWindow(hwnd(window), SW_HIDE) };
    }

    fn focus_monitor_desktop(&self, monitor: MonitorHandle) {
        // SAFETY: plain calls; a missing desktop window is only logged.
        unsafe {
            match FindWindowW(w!("Progman"), None) {
                Ok(desktop) => {
                    let _ = SetForegroundWindow(desktop);
                }
                Err(err) => tracing::debug!(%monitor, error = %err, "desktop window not found"),
            }
        }
    }

    fn set_window_positions(&self, positions: &[WindowPosition]) -> Result<(), NativeError> {
        let count = i32::try_from(positions.len()).unwrap_or(i32::MAX);
        // SAFETY: the defer handle is threaded through every DeferWindowPos call and
        // consumed by EndDeferWindowPos.
        unsafe {
            let mut batch = BeginDeferWindowPos(count).map_err(|err| call_error("BeginDeferWindowPos", &err))?;

            for position in positions {
                let window = hwnd(position.handle);
                let command = match position.size {
                    WindowSize::Normal => SW_SHOWNOACTIVATE,
                    WindowSize::Minimized => SW_SHOWMINNOACTIVE,
                    WindowSize::Maximized => SW_SHOWMAXIMIZED,
                };
                let _ = ShowWindow(window, command);
                if position.size != WindowSize::Normal {
                    continue;
                }

                let (x, y, width, height) = position.rect.to_pixels();
                let flags = SWP_FRAMECHANGED | SWP_NOACTIVATE | SWP_NOCOPYBITS | SWP_NOZORDER | SWP_NOOWNERZORDER;
                batch = match DeferWindowPos(batch, window, None, x, y, width, height, flags) {
                    Ok(next) => next,
                    Err(err) => {
                        tracing::warn!(window = %position.handle, error = %err, "failed to queue window position");
                        return Err(call_error("DeferWindowPos", &err));
                    }
                };
            }

            EndDeferWindowPos(batch).map_err(|err| call_error("EndDeferWindowPos", &err))
        }
    }

    fn keyboard_state(&self) -> Option<KeyboardState> {
        let mut state = [0u8; 256];
        for key in Modifiers::KEYS.iter().map(|(_, key, _)| *key) {
            // SAFETY: no preconditions.
            if unsafe { GetKeyState(i32::from(key)) } < 0 {
                state[usize::from(key)] = 0x80;
            }
        }
        Some(state)
    }
}
