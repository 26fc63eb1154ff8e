//! Window sector: every tracked window, keyed by handle.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::Window;
use crate::native::WindowHandle;
use crate::store::events::WindowEvent;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WindowSector {
    windows: BTreeMap<WindowHandle, Window>,
    /// Windows found at startup. They are placed by saved state, not by the router.
    startup_windows: BTreeSet<WindowHandle>,
    /// The window currently being dragged or resized by the user.
    moving: Option<WindowHandle>,
    events: Vec<WindowEvent>,
}

impl WindowSector {
    #[must_use]
    pub fn get(&self, handle: WindowHandle) -> Option<&Window> { self.windows.get(&handle) }

    #[must_use]
    pub fn contains(&self, handle: WindowHandle) -> bool { self.windows.contains_key(&handle) }

    pub fn iter(&self) -> impl Iterator<Item = &Window> { self.windows.values() }

    pub fn handles(&self) -> impl Iterator<Item = WindowHandle> + '_ { self.windows.keys().copied() }

    #[must_use]
    pub fn len(&self) -> usize { self.windows.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.windows.is_empty() }

    pub fn insert(&mut self, window: Window) { self.windows.insert(window.handle, window); }

    pub fn remove(&mut self, handle: WindowHandle) -> Option<Window> {
        self.startup_windows.remove(&handle);
        if self.moving == Some(handle) {
            self.moving = None;
        }
        self.windows.remove(&handle)
    }

    pub fn set_minimized(&mut self, handle: WindowHandle, minimized: bool) {
        if let Some(window) = self.windows.get_mut(&handle) {
            window.is_minimized = minimized;
        }
    }

    #[must_use]
    pub const fn moving(&self) -> Option<WindowHandle> { self.moving }

    pub fn set_moving(&mut self, handle: Option<WindowHandle>) { self.moving = handle; }

    #[must_use]
    pub fn is_startup_window(&self, handle: WindowHandle) -> bool { self.startup_windows.contains(&handle) }

    pub fn mark_startup_window(&mut self, handle: WindowHandle) { self.startup_windows.insert(handle); }

    pub fn clear_startup_windows(&mut self) { self.startup_windows.clear(); }

    pub fn queue(&mut self, event: WindowEvent) { self.events.push(event); }

    pub fn take_events(&mut self) -> Vec<WindowEvent> { std::mem::take(&mut self.events) }
}
