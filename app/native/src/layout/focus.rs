//! Focus layout: one window at a time.
//!
//! The window on top of the stack fills the rectangle, every other window is minimized.
//! Focusing changes which window is on top without reordering; swapping reorders
//! without changing the top.
//!
//! Custom actions, prefixed by the engine name:
//! - `<name>.toggle_maximized`
//! - `<name>.set_maximized`
//! - `<name>.unset_maximized`

use std::sync::Arc;

use tracing::debug;

use super::helpers::index_of;
use super::{EngineRef, LayoutEngine, LayoutEngineCustomAction, LayoutEngineId, Placements, WindowPlacement};
use crate::geometry::{Direction, Point, Rect, wrap_index};
use crate::model::{Monitor, WindowList};
use crate::native::{WindowHandle, WindowSize};

#[derive(Clone, Debug)]
pub struct FocusLayoutEngine {
    identity: LayoutEngineId,
    name: String,
    windows: WindowList,
    top_index: usize,
    is_maximized: bool,
    hide_focused_window: bool,
}

impl FocusLayoutEngine {
    #[must_use]
    pub fn new(name: impl Into<String>, is_maximized: bool) -> Self {
        Self {
            identity: LayoutEngineId::new(),
            name: name.into(),
            windows: WindowList::new(),
            top_index: 0,
            is_maximized,
            hide_focused_window: false,
        }
    }

    #[must_use]
    pub fn new_ref() -> EngineRef { Arc::new(Self::new("Focus", false)) }

    #[must_use]
    pub fn top(&self) -> Option<WindowHandle> { self.windows.get(self.top_index).copied() }

    #[must_use]
    pub const fn is_maximized(&self) -> bool { self.is_maximized }

    fn action_name(&self, action: &str) -> String { format!("{}.{action}", self.name) }

    fn top_size(&self) -> WindowSize {
        if self.is_maximized {
            WindowSize::Maximized
        } else if self.hide_focused_window {
            WindowSize::Minimized
        } else {
            WindowSize::Normal
        }
    }

    fn with_state(&self, windows: WindowList, top_index: usize, is_maximized: bool, hide: bool) -> EngineRef {
        Arc::new(Self {
            identity: self.identity,
            name: self.name.clone(),
            windows,
            top_index,
            is_maximized,
            hide_focused_window: hide,
        })
    }

    fn pushed(&self, window: WindowHandle) -> WindowList {
        let mut windows = self.windows.clone();
        windows.push(window);
        windows
    }

    fn swapped(&self, a: usize, b: usize) -> WindowList {
        let mut windows = self.windows.clone();
        windows.swap(a, b);
        windows
    }
}

impl LayoutEngine for FocusLayoutEngine {
    fn name(&self) -> &str { &self.name }

    fn identity(&self) -> LayoutEngineId { self.identity }

    fn count(&self) -> usize { self.windows.len() }

    fn contains_window(&self, window: WindowHandle) -> bool { self.windows.contains(&window) }

    fn first_window(&self) -> Option<WindowHandle> { self.windows.first().copied() }

    fn do_layout<'a>(&'a self, rect: Rect, _monitor: &'a Monitor) -> Placements<'a> {
        let top = self
            .top()
            .map(|window| WindowPlacement { window, rect, size: self.top_size() });
        let rest = self
            .windows
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.top_index)
            .map(move |(_, window)| WindowPlacement { window: *window, rect, size: WindowSize::Minimized });

        Box::new(top.into_iter().chain(rest))
    }

    /// New windows go on top.
    fn add_window(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if self.contains_window(window) {
            return self;
        }

        debug!(engine = %self.name, %window, "adding window");
        let windows = self.pushed(window);
        let top = windows.len() - 1;
        self.with_state(windows, top, self.is_maximized, false)
    }

    fn remove_window(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        let Some(idx) = index_of(&self.windows, window) else {
            return self;
        };

        let mut windows = self.windows.clone();
        windows.remove(idx);
        let top = if idx < self.top_index {
            self.top_index - 1
        } else if idx == self.top_index {
            self.top_index.saturating_sub(1)
        } else {
            self.top_index
        };
        self.with_state(windows, top, self.is_maximized, self.hide_focused_window)
    }

    fn move_window_to_point(self: Arc<Self>, window: WindowHandle, _point: Point) -> EngineRef {
        self.add_window(window)
    }

    fn focus_window_in_direction(
        self: Arc<Self>,
        direction: Direction,
        window: WindowHandle,
    ) -> (EngineRef, Option<WindowHandle>) {
        let Some(idx) = index_of(&self.windows, window) else {
            debug!(engine = %self.name, %window, "window not in engine");
            return (self, None);
        };

        let delta = match direction {
            Direction::Left | Direction::Up => -1,
            Direction::Right | Direction::Down => 1,
        };
        #[allow(clippy::cast_possible_wrap)]
        let top = wrap_index(idx as isize + delta, self.windows.len());
        let target = self.windows[top];
        let next = self.with_state(self.windows.clone(), top, self.is_maximized, self.hide_focused_window);
        (next, Some(target))
    }

    fn swap_window_in_direction(self: Arc<Self>, direction: Direction, window: WindowHandle) -> EngineRef {
        let Some(idx) = index_of(&self.windows, window) else {
            return self;
        };

        let delta = if direction == Direction::Up { -1 } else { 1 };
        #[allow(clippy::cast_possible_wrap)]
        let other = wrap_index(idx as isize + delta, self.windows.len());
        if other == idx {
            return self;
        }

        self.with_state(self.swapped(idx, other), self.top_index, self.is_maximized, self.hide_focused_window)
    }

    fn move_window_edges_in_direction(
        self: Arc<Self>,
        _edge: Direction,
        _deltas: Point,
        _window: WindowHandle,
    ) -> EngineRef {
        self
    }

    fn minimize_window_start(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        match index_of(&self.windows, window) {
            None => {
                let hide = self.windows.is_empty() || self.hide_focused_window;
                let windows = self.pushed(window);
                let top = windows.len() - 1;
                self.with_state(windows, top, self.is_maximized, hide)
            }
            Some(idx) if idx == self.top_index && !self.hide_focused_window => {
                self.with_state(self.windows.clone(), idx, self.is_maximized, true)
            }
            Some(_) => self,
        }
    }

    fn minimize_window_end(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        let (windows, top) = match index_of(&self.windows, window) {
            Some(idx) if idx == self.top_index && !self.hide_focused_window => return self,
            Some(idx) => (self.windows.clone(), idx),
            None => {
                let windows = self.pushed(window);
                let top = windows.len() - 1;
                (windows, top)
            }
        };

        self.with_state(windows, top, self.is_maximized, false)
    }

    fn perform_custom_action(self: Arc<Self>, action: &LayoutEngineCustomAction) -> EngineRef {
        let maximized = if action.name == self.action_name("toggle_maximized") {
            !self.is_maximized
        } else if action.name == self.action_name("set_maximized") {
            true
        } else if action.name == self.action_name("unset_maximized") {
            false
        } else {
            return self;
        };

        if maximized == self.is_maximized {
            return self;
        }

        debug!(engine = %self.name, maximized, "changing maximized state");
        self.with_state(self.windows.clone(), self.top_index, maximized, self.hide_focused_window)
    }
}
