//! Column layout: every window gets an equal-width column.
//!
//! ```text
//! Left to right:          Right to left:
//! ┌─────┬─────┬─────┐     ┌─────┬─────┬─────┐
//! │  1  │  2  │  3  │     │  3  │  2  │  1  │
//! └─────┴─────┴─────┘     └─────┴─────┴─────┘
//! ```
//!
//! Minimized windows leave the column set and are reported as minimized.

use std::sync::Arc;

use tracing::{debug, warn};

use super::helpers::{index_of, slice, step};
use super::{EngineRef, LayoutEngine, LayoutEngineCustomAction, LayoutEngineId, Placements, WindowPlacement};
use crate::geometry::{Direction, Point, Rect, wrap_index};
use crate::model::{Monitor, WindowList};
use crate::native::{WindowHandle, WindowSize};

#[derive(Clone, Debug)]
pub struct ColumnLayoutEngine {
    identity: LayoutEngineId,
    name: String,
    left_to_right: bool,
    windows: WindowList,
    minimized: WindowList,
}

impl ColumnLayoutEngine {
    #[must_use]
    pub fn new(name: impl Into<String>, left_to_right: bool) -> Self {
        Self {
            identity: LayoutEngineId::new(),
            name: name.into(),
            left_to_right,
            windows: WindowList::new(),
            minimized: WindowList::new(),
        }
    }

    /// A shared, empty engine with the default name for its direction.
    #[must_use]
    pub fn new_ref(left_to_right: bool) -> EngineRef {
        let name = if left_to_right { "Column" } else { "Column (right to left)" };
        Arc::new(Self::new(name, left_to_right))
    }

    #[must_use]
    pub const fn left_to_right(&self) -> bool { self.left_to_right }

    fn with_lists(&self, windows: WindowList, minimized: WindowList) -> EngineRef {
        Arc::new(Self {
            identity: self.identity,
            name: self.name.clone(),
            left_to_right: self.left_to_right,
            windows,
            minimized,
        })
    }

    /// Column index for a unit-square x coordinate, given `count` existing columns.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn index_at(&self, x: f64, count: usize) -> usize {
        let idx = (x * count as f64).round().clamp(0.0, count as f64) as usize;
        if self.left_to_right { idx } else { count - idx }
    }
}

impl LayoutEngine for ColumnLayoutEngine {
    fn name(&self) -> &str { &self.name }

    fn identity(&self) -> LayoutEngineId { self.identity }

    fn count(&self) -> usize { self.windows.len() + self.minimized.len() }

    fn contains_window(&self, window: WindowHandle) -> bool {
        self.windows.contains(&window) || self.minimized.contains(&window)
    }

    fn first_window(&self) -> Option<WindowHandle> {
        self.windows.first().or_else(|| self.minimized.first()).copied()
    }

    fn do_layout<'a>(&'a self, rect: Rect, _monitor: &'a Monitor) -> Placements<'a> {
        let count = self.windows.len();
        let tiled = self.windows.iter().enumerate().map(move |(i, window)| {
            let column = if self.left_to_right { i } else { count - 1 - i };
            WindowPlacement::normal(*window, slice(&rect, column, count, true))
        });
        let minimized = self
            .minimized
            .iter()
            .map(move |window| WindowPlacement { window: *window, rect, size: WindowSize::Minimized });

        Box::new(tiled.chain(minimized))
    }

    fn add_window(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if self.contains_window(window) {
            return self;
        }

        debug!(engine = %self.name, %window, "adding window");
        let mut windows = self.windows.clone();
        windows.push(window);
        self.with_lists(windows, self.minimized.clone())
    }

    fn remove_window(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if !self.contains_window(window) {
            return self;
        }

        debug!(engine = %self.name, %window, "removing window");
        let mut windows = self.windows.clone();
        let mut minimized = self.minimized.clone();
        windows.retain(|w| *w != window);
        minimized.retain(|w| *w != window);
        self.with_lists(windows, minimized)
    }

    fn move_window_to_point(self: Arc<Self>, window: WindowHandle, point: Point) -> EngineRef {
        let mut windows = self.windows.clone();
        let current = index_of(&windows, window);
        windows.retain(|w| *w != window);

        let idx = self.index_at(point.x, windows.len());
        if current == Some(idx) {
            return self;
        }

        debug!(engine = %self.name, %window, %point, idx, "moving window to point");
        windows.insert(idx, window);
        let mut minimized = self.minimized.clone();
        minimized.retain(|w| *w != window);
        self.with_lists(windows, minimized)
    }

    fn focus_window_in_direction(
        self: Arc<Self>,
        direction: Direction,
        window: WindowHandle,
    ) -> (EngineRef, Option<WindowHandle>) {
        let Some(delta) = step(direction, true, self.left_to_right) else {
            return (self, None);
        };
        let Some(idx) = index_of(&self.windows, window) else {
            warn!(engine = %self.name, %window, "window not found for focus");
            return (self, None);
        };

        #[allow(clippy::cast_possible_wrap)]
        let target = self.windows[wrap_index(idx as isize + delta, self.windows.len())];
        (self, Some(target))
    }

    fn swap_window_in_direction(self: Arc<Self>, direction: Direction, window: WindowHandle) -> EngineRef {
        let Some(delta) = step(direction, true, self.left_to_right) else {
            return self;
        };
        let Some(idx) = index_of(&self.windows, window) else {
            warn!(engine = %self.name, %window, "window not found for swap");
            return self;
        };

        #[allow(clippy::cast_possible_wrap)]
        let adjacent = wrap_index(idx as isize + delta, self.windows.len());
        if adjacent == idx {
            return self;
        }

        let mut windows = self.windows.clone();
        windows.swap(idx, adjacent);
        self.with_lists(windows, self.minimized.clone())
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
        if self.minimized.contains(&window) {
            return self;
        }

        let mut windows = self.windows.clone();
        windows.retain(|w| *w != window);
        let mut minimized = self.minimized.clone();
        minimized.push(window);
        self.with_lists(windows, minimized)
    }

    fn minimize_window_end(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if self.windows.contains(&window) {
            return self;
        }

        let mut minimized = self.minimized.clone();
        minimized.retain(|w| *w != window);
        let mut windows = self.windows.clone();
        windows.push(window);
        self.with_lists(windows, minimized)
    }

    fn perform_custom_action(self: Arc<Self>, _action: &LayoutEngineCustomAction) -> EngineRef { self }
}
