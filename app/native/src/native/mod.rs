//! Native window-system layer.
//!
//! Everything that touches the OS goes through [`NativeApi`]. The kernel never calls
//! the OS directly, which keeps the store, the butler and the layout engines testable
//! against [`fake::FakeNative`].
//!
//! # Backends
//!
//! - [`win32`] - the real backend, built only on Windows
//! - [`fake`] - an in-memory window system used by tests and non-Windows builds
//!
//! # Thread affinity
//!
//! Window handles are thread-affine. Implementations are only ever called from the
//! owner thread, so the trait carries no `Send`/`Sync` bound.

pub mod batch;
pub mod fake;
#[cfg(windows)]
pub mod win32;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use batch::DeferredPositions;

use crate::geometry::{Point, Rect};

// ============================================================================
// Handles
// ============================================================================

/// An OS window handle (`HWND`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    /// The null handle, never a real window.
    pub const NULL: Self = Self(0);

    #[must_use]
    pub const fn is_null(self) -> bool { self.0 == 0 }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:#x}", self.0) }
}

/// An OS monitor handle (`HMONITOR`).
///
/// Handles are not stable across every topology change, so monitors are compared by
/// geometry when a new enumeration is diffed against the previous one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorHandle(pub isize);

impl fmt::Display for MonitorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:#x}", self.0) }
}

// ============================================================================
// Native Data
// ============================================================================

/// A display as reported by the OS.
#[derive(Clone, Debug, PartialEq)]
pub struct MonitorInfo {
    pub handle: MonitorHandle,
    /// Device name, e.g. `\\.\DISPLAY1`.
    pub device_name: String,
    /// Full bounds of the display.
    pub bounds: Rect,
    /// Bounds minus the taskbar and docked app bars.
    pub working_area: Rect,
    /// Scale factor in percent (100 = unscaled).
    pub scale_factor: u32,
    pub is_primary: bool,
}

/// A snapshot of the OS-level properties of a top-level window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    pub title: String,
    pub class_name: String,
    pub process_id: u32,
    /// Executable file name, e.g. `firefox.exe`. `None` if the process could not be opened.
    pub process_file_name: Option<String>,
    pub is_minimized: bool,
    pub is_maximized: bool,
    pub is_visible: bool,
    pub is_cloaked: bool,
    pub is_splash_screen: bool,
    /// A standard, user-facing top-level window (not a tool window or child).
    pub is_standard: bool,
    pub has_visible_owner: bool,
}

/// How a window should be shown once positioned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowSize {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

/// A single positioning request inside a batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowPosition {
    pub handle: WindowHandle,
    pub rect: Rect,
    pub size: WindowSize,
}

/// Virtual-key state as returned by `GetKeyboardState`.
pub type KeyboardState = [u8; 256];

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by native calls.
#[derive(Debug, Error)]
pub enum NativeError {
    /// A global hook could not be installed. The manager cannot run without it.
    #[error("failed to install {hook} hook: {message}")]
    HookInstall { hook: &'static str, message: String },

    /// The window no longer exists.
    #[error("window {0} no longer exists")]
    WindowGone(WindowHandle),

    /// The OS reported no monitors.
    #[error("no monitors were found")]
    NoMonitors,

    /// A native call failed.
    #[error("{function} failed: {message}")]
    Call { function: &'static str, message: String },
}

// ============================================================================
// Native API
// ============================================================================

/// The operations the kernel needs from the window system.
pub trait NativeApi {
    /// Enumerates the displays in OS order.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::NoMonitors`] if the OS reports none.
    fn enumerate_monitors(&self) -> Result<Vec<MonitorInfo>, NativeError>;

    /// The monitor nearest to a screen point.
    fn monitor_from_point(&self, point: Point) -> Option<MonitorHandle>;

    /// The monitor nearest to a window.
    fn monitor_from_window(&self, window: WindowHandle) -> Option<MonitorHandle>;

    /// Reads the properties of a window.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::WindowGone`] if the window was destroyed.
    fn window_info(&self, window: WindowHandle) -> Result<WindowInfo, NativeError>;

    /// Every top-level window, in z-order.
    fn top_level_windows(&self) -> Vec<WindowHandle>;

    /// Whether the handle still refers to a window.
    fn is_window(&self, window: WindowHandle) -> bool;

    /// The visible frame of a window, excluding invisible resize borders.
    fn window_rect(&self, window: WindowHandle) -> Option<Rect>;

    /// The difference between the outer window rectangle and its visible frame.
    fn window_offset(&self, window: WindowHandle) -> Option<Rect>;

    fn foreground_window(&self) -> Option<WindowHandle>;

    fn cursor_position(&self) -> Option<Point>;

    fn focus_window(&self, window: WindowHandle);

    fn hide_window(&self, window: WindowHandle);

    /// Focuses the desktop so that no window on the monitor keeps focus.
    fn focus_monitor_desktop(&self, monitor: MonitorHandle);

    /// Applies every position in one batch.
    ///
    /// This is the only way the kernel moves windows: one call per layout pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be started or committed.
    fn set_window_positions(&self, positions: &[WindowPosition]) -> Result<(), NativeError>;

    /// Reads the current state of every virtual key.
    fn keyboard_state(&self) -> Option<KeyboardState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_display_as_hex() {
        assert_eq!(WindowHandle(0x1f).to_string(), "0x1f");
        assert_eq!(MonitorHandle(16).to_string(), "0x10");
    }

    #[test]
    fn test_null_window_handle() {
        assert!(WindowHandle::NULL.is_null());
        assert!(!WindowHandle(1).is_null());
    }

    #[test]
    fn test_native_error_display() {
        let err = NativeError::HookInstall { hook: "keyboard", message: "denied".to_string() };
        assert_eq!(err.to_string(), "failed to install keyboard hook: denied");

        let err = NativeError::WindowGone(WindowHandle(0x10));
        assert!(err.to_string().contains("0x10"));
    }
}
