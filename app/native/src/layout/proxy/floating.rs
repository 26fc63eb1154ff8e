//! Floating windows.
//!
//! A floating window is taken out of the inner engine and kept at a rectangle stored
//! in unit-square coordinates, so it follows resolution changes. Windows are marked
//! and unmarked through custom actions:
//!
//! - `floating.mark`: payload is the unit rectangle, centred half-size when absent
//! - `floating.unmark`: hands the window back to the inner engine

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::debug;

use super::{Proxy, forward_to_inner, rewrap};
use crate::geometry::{Direction, Point, Rect};
use crate::layout::{EngineRef, LayoutEngine, LayoutEngineCustomAction, LayoutEngineId, Placements, WindowPlacement};
use crate::model::Monitor;
use crate::native::WindowHandle;

pub const MARK_ACTION: &str = "floating.mark";
pub const UNMARK_ACTION: &str = "floating.unmark";

const DEFAULT_UNIT_RECT: Rect = Rect::new(0.25, 0.25, 0.5, 0.5);

type FloatingWindows = SmallVec<[(WindowHandle, Rect); 4]>;

#[derive(Clone, Debug)]
pub struct FloatingLayoutEngine {
    identity: LayoutEngineId,
    inner: EngineRef,
    floating: FloatingWindows,
}

impl FloatingLayoutEngine {
    #[must_use]
    pub fn wrap(inner: EngineRef) -> EngineRef {
        Arc::new(Self { identity: LayoutEngineId::new(), inner, floating: FloatingWindows::new() })
    }

    #[must_use]
    pub fn is_floating(&self, window: WindowHandle) -> bool { self.unit_rect(window).is_some() }

    fn unit_rect(&self, window: WindowHandle) -> Option<Rect> {
        self.floating.iter().find(|(w, _)| *w == window).map(|(_, rect)| *rect)
    }

    fn with_state(&self, inner: EngineRef, floating: FloatingWindows) -> EngineRef {
        Arc::new(Self { identity: self.identity, inner, floating })
    }

    fn with_rect(self: Arc<Self>, window: WindowHandle, rect: Rect) -> EngineRef {
        if self.unit_rect(window) == Some(rect) {
            return self;
        }

        let mut floating = self.floating.clone();
        match floating.iter_mut().find(|(w, _)| *w == window) {
            Some(entry) => entry.1 = rect,
            None => floating.push((window, rect)),
        }
        let inner = Arc::clone(&self.inner).remove_window(window);
        self.with_state(inner, floating)
    }

    fn mark(self: Arc<Self>, window: WindowHandle, payload: &serde_json::Value) -> EngineRef {
        let rect = serde_json::from_value::<Rect>(payload.clone())
            .ok()
            .filter(Rect::is_valid)
            .unwrap_or(DEFAULT_UNIT_RECT);

        debug!(%window, %rect, "marking window as floating");
        self.with_rect(window, rect)
    }

    fn unmark(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if !self.is_floating(window) {
            return self;
        }

        debug!(%window, "unmarking floating window");
        let mut floating = self.floating.clone();
        floating.retain(|(w, _)| *w != window);
        let inner = Arc::clone(&self.inner).add_window(window);
        self.with_state(inner, floating)
    }
}

impl Proxy for FloatingLayoutEngine {
    fn inner_engine(&self) -> &EngineRef { &self.inner }

    fn with_inner(&self, inner: EngineRef) -> Self { Self { inner, ..self.clone() } }
}

impl LayoutEngine for FloatingLayoutEngine {
    forward_to_inner!(name, identity, inner);

    fn count(&self) -> usize { self.inner.count() + self.floating.len() }

    fn contains_window(&self, window: WindowHandle) -> bool {
        self.is_floating(window) || self.inner.contains_window(window)
    }

    fn first_window(&self) -> Option<WindowHandle> {
        self.inner.first_window().or_else(|| self.floating.first().map(|(w, _)| *w))
    }

    fn do_layout<'a>(&'a self, rect: Rect, monitor: &'a Monitor) -> Placements<'a> {
        let floating = self
            .floating
            .iter()
            .map(move |(window, unit)| WindowPlacement::normal(*window, rect.rect_from_unit_square(unit)));

        Box::new(floating.chain(self.inner.do_layout(rect, monitor)))
    }

    fn add_window(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if self.is_floating(window) {
            return self;
        }
        let updated = Arc::clone(&self.inner).add_window(window);
        rewrap(self, updated)
    }

    fn remove_window(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if self.is_floating(window) {
            let mut floating = self.floating.clone();
            floating.retain(|(w, _)| *w != window);
            return self.with_state(Arc::clone(&self.inner), floating);
        }
        let updated = Arc::clone(&self.inner).remove_window(window);
        rewrap(self, updated)
    }

    /// A floating window keeps its size and is recentred on `point`.
    fn move_window_to_point(self: Arc<Self>, window: WindowHandle, point: Point) -> EngineRef {
        match self.unit_rect(window) {
            Some(rect) => {
                let moved = Rect::new(point.x - rect.width / 2.0, point.y - rect.height / 2.0, rect.width, rect.height);
                self.with_rect(window, moved)
            }
            None => {
                let updated = Arc::clone(&self.inner).move_window_to_point(window, point);
                rewrap(self, updated)
            }
        }
    }

    fn focus_window_in_direction(
        self: Arc<Self>,
        direction: Direction,
        window: WindowHandle,
    ) -> (EngineRef, Option<WindowHandle>) {
        if self.is_floating(window) {
            return (self, None);
        }
        let (updated, target) = Arc::clone(&self.inner).focus_window_in_direction(direction, window);
        (rewrap(self, updated), target)
    }

    fn swap_window_in_direction(self: Arc<Self>, direction: Direction, window: WindowHandle) -> EngineRef {
        if self.is_floating(window) {
            return self;
        }
        let updated = Arc::clone(&self.inner).swap_window_in_direction(direction, window);
        rewrap(self, updated)
    }

    /// Floating windows are resized directly, in unit-square deltas.
    fn move_window_edges_in_direction(
        self: Arc<Self>,
        edge: Direction,
        deltas: Point,
        window: WindowHandle,
    ) -> EngineRef {
        let Some(rect) = self.unit_rect(window) else {
            let updated = Arc::clone(&self.inner).move_window_edges_in_direction(edge, deltas, window);
            return rewrap(self, updated);
        };

        let resized = match edge {
            Direction::Left => Rect::new(rect.x + deltas.x, rect.y, rect.width - deltas.x, rect.height),
            Direction::Right => Rect::new(rect.x, rect.y, rect.width + deltas.x, rect.height),
            Direction::Up => Rect::new(rect.x, rect.y + deltas.y, rect.width, rect.height - deltas.y),
            Direction::Down => Rect::new(rect.x, rect.y, rect.width, rect.height + deltas.y),
        };
        if !resized.is_valid() {
            return self;
        }
        self.with_rect(window, resized)
    }

    fn minimize_window_start(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if self.is_floating(window) {
            return self;
        }
        let updated = Arc::clone(&self.inner).minimize_window_start(window);
        rewrap(self, updated)
    }

    fn minimize_window_end(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if self.is_floating(window) {
            return self;
        }
        let updated = Arc::clone(&self.inner).minimize_window_end(window);
        rewrap(self, updated)
    }

    fn perform_custom_action(self: Arc<Self>, action: &LayoutEngineCustomAction) -> EngineRef {
        match (action.name.as_str(), action.window) {
            (MARK_ACTION, Some(window)) => self.mark(window, &action.payload),
            (UNMARK_ACTION, Some(window)) => self.unmark(window),
            (MARK_ACTION | UNMARK_ACTION, None) => self,
            _ => {
                let updated = Arc::clone(&self.inner).perform_custom_action(action);
                rewrap(self, updated)
            }
        }
    }
}
