//! In-memory window system.
//!
//! `FakeNative` implements [`NativeApi`] over plain data so that the store, the
//! butler, the listener and the keybind hook can run without an OS. It records every
//! side effect (position batches, focus calls, hidden windows) for assertions.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use super::{
    KeyboardState, MonitorHandle, MonitorInfo, NativeApi, NativeError, WindowHandle, WindowInfo,
    WindowPosition, WindowSize,
};
use crate::geometry::{Point, Rect};

#[derive(Default)]
struct FakeState {
    monitors: Vec<MonitorInfo>,
    windows: HashMap<WindowHandle, WindowInfo>,
    rects: HashMap<WindowHandle, Rect>,
    window_monitors: HashMap<WindowHandle, MonitorHandle>,
    foreground: Option<WindowHandle>,
    cursor: Option<Point>,
    pressed_keys: HashSet<u8>,
    position_batches: Vec<Vec<WindowPosition>>,
    focus_calls: Vec<WindowHandle>,
    hidden: Vec<WindowHandle>,
    desktop_focus_calls: Vec<MonitorHandle>,
    fail_positioning: bool,
    panicking_window: Option<WindowHandle>,
}

/// A scriptable window system for tests.
#[derive(Default)]
pub struct FakeNative {
    state: Mutex<FakeState>,
}

impl FakeNative {
    #[must_use]
    pub fn new(monitors: Vec<MonitorInfo>) -> Self {
        Self { state: Mutex::new(FakeState { monitors, ..FakeState::default() }) }
    }

    /// A single primary 1920x1080 monitor with a 40px taskbar.
    #[must_use]
    pub fn with_single_monitor() -> Self { Self::new(vec![Self::monitor(1, 0.0, 0.0, true)]) }

    /// Two side-by-side 1920x1080 monitors, the left one primary.
    #[must_use]
    pub fn with_two_monitors() -> Self {
        Self::new(vec![Self::monitor(1, 0.0, 0.0, true), Self::monitor(2, 1920.0, 0.0, false)])
    }

    /// Builds a 1920x1080 monitor at the given origin.
    #[must_use]
    pub fn monitor(handle: isize, x: f64, y: f64, is_primary: bool) -> MonitorInfo {
        MonitorInfo {
            handle: MonitorHandle(handle),
            device_name: format!("\\\\.\\DISPLAY{handle}"),
            bounds: Rect::new(x, y, 1920.0, 1080.0),
            working_area: Rect::new(x, y, 1920.0, 1040.0),
            scale_factor: 100,
            is_primary,
        }
    }

    /// Builds a visible, standard top-level window owned by `process`.
    #[must_use]
    pub fn standard_window(handle: isize, process: &str) -> WindowInfo {
        WindowInfo {
            handle: WindowHandle(handle),
            title: format!("{process} window {handle}"),
            class_name: "ApplicationFrameWindow".to_string(),
            process_id: 1000 + u32::try_from(handle).unwrap_or_default(),
            process_file_name: Some(process.to_string()),
            is_visible: true,
            is_standard: true,
            ..WindowInfo::default()
        }
    }

    pub fn add_window(&self, info: WindowInfo) {
        let mut state = self.state.lock();
        state.rects.entry(info.handle).or_insert_with(|| Rect::new(100.0, 100.0, 800.0, 600.0));
        state.windows.insert(info.handle, info);
    }

    pub fn remove_window(&self, handle: WindowHandle) {
        let mut state = self.state.lock();
        state.windows.remove(&handle);
        state.rects.remove(&handle);
        state.window_monitors.remove(&handle);
    }

    pub fn update_window(&self, handle: WindowHandle, update: impl FnOnce(&mut WindowInfo)) {
        if let Some(info) = self.state.lock().windows.get_mut(&handle) {
            update(info);
        }
    }

    pub fn set_window_rect(&self, handle: WindowHandle, rect: Rect) {
        self.state.lock().rects.insert(handle, rect);
    }

    /// Pins the monitor that `monitor_from_window` reports for a window.
    pub fn set_window_monitor(&self, handle: WindowHandle, monitor: MonitorHandle) {
        self.state.lock().window_monitors.insert(handle, monitor);
    }

    pub fn set_monitors(&self, monitors: Vec<MonitorInfo>) { self.state.lock().monitors = monitors; }

    pub fn set_foreground(&self, handle: Option<WindowHandle>) {
        self.state.lock().foreground = handle;
    }

    pub fn set_cursor(&self, point: Point) { self.state.lock().cursor = Some(point); }

    pub fn press_key(&self, vk: u8) { self.state.lock().pressed_keys.insert(vk); }

    pub fn release_key(&self, vk: u8) { self.state.lock().pressed_keys.remove(&vk); }

    /// Makes every later [`NativeApi::window_info`] call for `handle` panic.
    pub fn panic_on_window_info(&self, handle: WindowHandle) { self.state.lock().panicking_window = Some(handle); }

    /// Makes every subsequent batch fail.
    pub fn fail_positioning(&self, fail: bool) { self.state.lock().fail_positioning = fail; }

    #[must_use]
    pub fn position_batches(&self) -> Vec<Vec<WindowPosition>> {
        self.state.lock().position_batches.clone()
    }

    /// The last position applied to a window.
    #[must_use]
    pub fn last_position(&self, handle: WindowHandle) -> Option<WindowPosition> {
        let state = self.state.lock();
        state.position_batches.iter().flatten().rev().find(|p| p.handle == handle).copied()
    }

    #[must_use]
    pub fn focus_calls(&self) -> Vec<WindowHandle> { self.state.lock().focus_calls.clone() }

    #[must_use]
    pub fn hidden_windows(&self) -> Vec<WindowHandle> { self.state.lock().hidden.clone() }

    #[must_use]
    pub fn desktop_focus_calls(&self) -> Vec<MonitorHandle> {
        self.state.lock().desktop_focus_calls.clone()
    }

    pub fn clear_recorded(&self) {
        let mut state = self.state.lock();
        state.position_batches.clear();
        state.focus_calls.clear();
        state.hidden.clear();
        state.desktop_focus_calls.clear();
    }

    fn nearest_monitor(monitors: &[MonitorInfo], point: Point) -> Option<MonitorHandle> {
        if let Some(monitor) = monitors.iter().find(|m| m.bounds.contains_point(point)) {
            return Some(monitor.handle);
        }

        monitors
            .iter()
            .min_by(|a, b| {
                let da = distance_sq(a.bounds.center(), point);
                let db = distance_sq(b.bounds.center(), point);
                da.total_cmp(&db)
            })
            .map(|m| m.handle)
    }
}

fn distance_sq(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx.mul_add(dx, dy * dy)
}

impl NativeApi for FakeNative {
    fn enumerate_monitors(&self) -> Result<Vec<MonitorInfo>, NativeError> {
        let monitors = self.state.lock().monitors.clone();
        if monitors.is_empty() {
            return Err(NativeError::NoMonitors);
        }
        Ok(monitors)
    }

    fn monitor_from_point(&self, point: Point) -> Option<MonitorHandle> {
        Self::nearest_monitor(&self.state.lock().monitors, point)
    }

    fn monitor_from_window(&self, window: WindowHandle) -> Option<MonitorHandle> {
        let state = self.state.lock();
        if let Some(monitor) = state.window_monitors.get(&window) {
            return Some(*monitor);
        }
        let rect = state.rects.get(&window)?;
        Self::nearest_monitor(&state.monitors, rect.center())
    }

    fn window_info(&self, window: WindowHandle) -> Result<WindowInfo, NativeError> {
        let state = self.state.lock();
        assert!(state.panicking_window != Some(window), "window_info({window}) failed hard");
        state.windows.get(&window).cloned().ok_or(NativeError::WindowGone(window))
    }

    fn top_level_windows(&self) -> Vec<WindowHandle> {
        let mut handles: Vec<_> = self.state.lock().windows.keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        self.state.lock().windows.contains_key(&window)
    }

    fn window_rect(&self, window: WindowHandle) -> Option<Rect> {
        self.state.lock().rects.get(&window).copied()
    }

    fn window_offset(&self, window: WindowHandle) -> Option<Rect> {
        self.state.lock().windows.contains_key(&window).then(Rect::zero)
    }

    fn foreground_window(&self) -> Option<WindowHandle> { self.state.lock().foreground }

    fn cursor_position(&self) -> Option<Point> { self.state.lock().cursor }

    fn focus_window(&self, window: WindowHandle) {
        let mut state = self.state.lock();
        state.focus_calls.push(window);
        if state.windows.contains_key(&window) {
            state.foreground = Some(window);
        }
    }

    fn hide_window(&self, window: WindowHandle) {
        let mut state = self.state.lock();
        state.hidden.push(window);
        if let Some(info) = state.windows.get_mut(&window) {
            info.is_visible = false;
        }
    }

    fn focus_monitor_desktop(&self, monitor: MonitorHandle) {
        let mut state = self.state.lock();
        state.desktop_focus_calls.push(monitor);
        state.foreground = None;
    }

    fn set_window_positions(&self, positions: &[WindowPosition]) -> Result<(), NativeError> {
        let mut state = self.state.lock();
        if state.fail_positioning {
            return Err(NativeError::Call {
                function: "EndDeferWindowPos",
                message: "positioning disabled".to_string(),
            });
        }

        for position in positions {
            if position.size == WindowSize::Normal {
                state.rects.insert(position.handle, position.rect);
            }
            if let Some(info) = state.windows.get_mut(&position.handle) {
                info.is_minimized = position.size == WindowSize::Minimized;
                info.is_maximized = position.size == WindowSize::Maximized;
                info.is_visible = true;
            }
        }
        state.position_batches.push(positions.to_vec());
        Ok(())
    }

    fn keyboard_state(&self) -> Option<KeyboardState> {
        let state = self.state.lock();
        let mut keys = [0u8; 256];
        for vk in &state.pressed_keys {
            keys[usize::from(*vk)] = 0x80;
        }
        Some(keys)
    }
}
