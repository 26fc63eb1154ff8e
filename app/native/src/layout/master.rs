//! Master layout - one master window with remaining windows in a stack.
//!
//! The first window is the "master" and gets `ratio` of the rectangle.
//! Remaining windows share the rest.
//!
//! ```text
//! Left:                 Top:
//! ┌──────────┬─────┐    ┌─────────┐
//! │          │  2  │    │ Master  │
//! │  Master  ├─────┤    ├────┬────┤
//! │          │  3  │    │ 2  │ 3  │
//! └──────────┴─────┘    └────┴────┘
//! ```
//!
//! `Right` and `Bottom` mirror these. `Auto` picks `Left` for landscape rectangles
//! and `Top` for portrait ones. Navigation, edge moves and drops follow the
//! orientation of the most recent layout. Dragging the edge between master and
//! stack changes the ratio.
//!
//! Custom actions, prefixed by the engine name:
//! - `<name>.promote` moves the action's window into the master slot
//! - `<name>.set_ratio` takes a number payload

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::helpers::{index_of, slice, split_horizontal, split_vertical};
use super::{EngineRef, LayoutEngine, LayoutEngineCustomAction, LayoutEngineId, Placements, WindowPlacement};
use crate::geometry::{Direction, Point, Rect};
use crate::model::{Monitor, WindowList};
use crate::native::{WindowHandle, WindowSize};

const MIN_RATIO: f64 = 0.1;
const MAX_RATIO: f64 = 0.9;

/// Where the master window sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MasterPosition {
    #[default]
    Auto,
    Left,
    Right,
    Top,
    Bottom,
}

impl MasterPosition {
    fn resolve(self, rect: &Rect) -> Self {
        match self {
            Self::Auto if rect.width >= rect.height => Self::Left,
            Self::Auto => Self::Top,
            other => other,
        }
    }

    const fn is_horizontal(self) -> bool { matches!(self, Self::Left | Self::Right | Self::Auto) }

    /// The direction pointing from the master slot toward the stack.
    const fn toward_stack(self) -> Direction {
        match self {
            Self::Left | Self::Auto => Direction::Right,
            Self::Right => Direction::Left,
            Self::Top => Direction::Down,
            Self::Bottom => Direction::Up,
        }
    }
}

/// Computes `(master, stack)` areas for `rect` with the master at `position`.
fn split_at(position: MasterPosition, ratio: f64, rect: &Rect) -> (Rect, Rect) {
    match position {
        MasterPosition::Left | MasterPosition::Auto => split_horizontal(rect, ratio, 0.0),
        MasterPosition::Right => {
            let (stack, master) = split_horizontal(rect, 1.0 - ratio, 0.0);
            (master, stack)
        }
        MasterPosition::Top => split_vertical(rect, ratio, 0.0),
        MasterPosition::Bottom => {
            let (stack, master) = split_vertical(rect, 1.0 - ratio, 0.0);
            (master, stack)
        }
    }
}

const fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::Left => Direction::Right,
        Direction::Right => Direction::Left,
        Direction::Up => Direction::Down,
        Direction::Down => Direction::Up,
    }
}

#[derive(Clone, Debug)]
pub struct MasterStackLayoutEngine {
    identity: LayoutEngineId,
    name: String,
    ratio: f64,
    position: MasterPosition,
    windows: WindowList,
    minimized: WindowList,
    /// Whether the last layout rect was portrait. Shared by every version.
    portrait: Arc<AtomicBool>,
}

impl MasterStackLayoutEngine {
    #[must_use]
    pub fn new(name: impl Into<String>, ratio: f64, position: MasterPosition) -> Self {
        Self {
            identity: LayoutEngineId::new(),
            name: name.into(),
            ratio: ratio.clamp(MIN_RATIO, MAX_RATIO),
            position,
            windows: WindowList::new(),
            minimized: WindowList::new(),
            portrait: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn new_ref(ratio: f64, position: MasterPosition) -> EngineRef {
        Arc::new(Self::new("Master", ratio, position))
    }

    #[must_use]
    pub const fn ratio(&self) -> f64 { self.ratio }

    fn rebuild(&self, windows: WindowList, minimized: WindowList, ratio: f64) -> EngineRef {
        Arc::new(Self {
            identity: self.identity,
            name: self.name.clone(),
            ratio,
            position: self.position,
            windows,
            minimized,
            portrait: Arc::clone(&self.portrait),
        })
    }

    fn with_windows(&self, windows: WindowList) -> EngineRef {
        self.rebuild(windows, self.minimized.clone(), self.ratio)
    }

    fn with_ratio(self: Arc<Self>, ratio: f64) -> EngineRef {
        let ratio = ratio.clamp(MIN_RATIO, MAX_RATIO);
        if (ratio - self.ratio).abs() < f64::EPSILON {
            return self;
        }

        debug!(engine = %self.name, ratio, "master ratio changed");
        self.rebuild(self.windows.clone(), self.minimized.clone(), ratio)
    }

    /// The configured position, with `Auto` resolved against the last layout.
    fn effective_position(&self) -> MasterPosition {
        match self.position {
            MasterPosition::Auto if self.portrait.load(Ordering::Relaxed) => MasterPosition::Top,
            MasterPosition::Auto => MasterPosition::Left,
            other => other,
        }
    }

    /// Computes `(master, stack)` areas for `rect`.
    fn split(&self, rect: &Rect) -> (Rect, Rect) { split_at(self.position.resolve(rect), self.ratio, rect) }

    /// Index of the window adjacent to `idx` in `direction`, if any.
    fn neighbour(&self, idx: usize, direction: Direction) -> Option<usize> {
        let count = self.windows.len();
        if count < 2 {
            return None;
        }

        let position = self.effective_position();
        let toward_stack = position.toward_stack();
        if idx == 0 {
            return (direction == toward_stack).then_some(1);
        }
        if direction == opposite(toward_stack) {
            return Some(0);
        }

        // Stack windows run along the axis perpendicular to the split.
        let along_stack = if position.is_horizontal() {
            matches!(direction, Direction::Up | Direction::Down)
        } else {
            direction.is_horizontal()
        };
        if !along_stack {
            return None;
        }

        match direction {
            Direction::Up | Direction::Left => (idx > 1).then(|| idx - 1),
            Direction::Down | Direction::Right => (idx + 1 < count).then_some(idx + 1),
        }
    }
}

impl LayoutEngine for MasterStackLayoutEngine {
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
        self.portrait.store(rect.height > rect.width, Ordering::Relaxed);
        let (master, stack) = self.split(&rect);
        let stack_count = self.windows.len().saturating_sub(1);
        let stack_is_column = self.position.resolve(&rect).is_horizontal();

        let tiled = self.windows.iter().enumerate().map(move |(i, window)| {
            let frame = match (i, stack_count) {
                (_, 0) => rect,
                (0, _) => master,
                (i, _) => slice(&stack, i - 1, stack_count, !stack_is_column),
            };
            WindowPlacement::normal(*window, frame)
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

        let mut windows = self.windows.clone();
        windows.push(window);
        self.with_windows(windows)
    }

    fn remove_window(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if !self.contains_window(window) {
            return self;
        }

        let mut windows = self.windows.clone();
        let mut minimized = self.minimized.clone();
        windows.retain(|w| *w != window);
        minimized.retain(|w| *w != window);
        self.rebuild(windows, minimized, self.ratio)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn move_window_to_point(self: Arc<Self>, window: WindowHandle, point: Point) -> EngineRef {
        let mut windows = self.windows.clone();
        let current = index_of(&windows, window);
        windows.retain(|w| *w != window);

        let position = self.effective_position();
        let (master, _) = split_at(position, self.ratio, &Rect::unit());
        let idx = if windows.is_empty() || master.contains_point(point) {
            0
        } else {
            let stack_count = windows.len().saturating_sub(1).max(1);
            let along = if position.is_horizontal() { point.y } else { point.x };
            1 + ((along * stack_count as f64).round().max(0.0) as usize).min(windows.len() - 1)
        };

        if current == Some(idx) {
            return self;
        }

        windows.insert(idx.min(windows.len()), window);
        let mut minimized = self.minimized.clone();
        minimized.retain(|w| *w != window);
        self.rebuild(windows, minimized, self.ratio)
    }

    fn focus_window_in_direction(
        self: Arc<Self>,
        direction: Direction,
        window: WindowHandle,
    ) -> (EngineRef, Option<WindowHandle>) {
        let target = index_of(&self.windows, window)
            .and_then(|idx| self.neighbour(idx, direction))
            .map(|idx| self.windows[idx]);
        (self, target)
    }

    fn swap_window_in_direction(self: Arc<Self>, direction: Direction, window: WindowHandle) -> EngineRef {
        let Some(idx) = index_of(&self.windows, window) else {
            return self;
        };
        let Some(other) = self.neighbour(idx, direction) else {
            return self;
        };

        let mut windows = self.windows.clone();
        windows.swap(idx, other);
        self.with_windows(windows)
    }

    fn move_window_edges_in_direction(
        self: Arc<Self>,
        edge: Direction,
        deltas: Point,
        window: WindowHandle,
    ) -> EngineRef {
        let Some(idx) = index_of(&self.windows, window) else {
            return self;
        };
        if self.windows.len() < 2 {
            return self;
        }

        let position = self.effective_position();
        let toward_stack = position.toward_stack();
        let split_edge = if idx == 0 { toward_stack } else { opposite(toward_stack) };
        if edge != split_edge {
            return self;
        }

        let delta = match position {
            MasterPosition::Left | MasterPosition::Auto => deltas.x,
            MasterPosition::Right => -deltas.x,
            MasterPosition::Top => deltas.y,
            MasterPosition::Bottom => -deltas.y,
        };
        let ratio = self.ratio + delta;
        self.with_ratio(ratio)
    }

    fn minimize_window_start(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if self.minimized.contains(&window) {
            return self;
        }

        let mut windows = self.windows.clone();
        windows.retain(|w| *w != window);
        let mut minimized = self.minimized.clone();
        minimized.push(window);
        self.rebuild(windows, minimized, self.ratio)
    }

    fn minimize_window_end(self: Arc<Self>, window: WindowHandle) -> EngineRef {
        if self.windows.contains(&window) {
            return self;
        }

        let mut minimized = self.minimized.clone();
        minimized.retain(|w| *w != window);
        let mut windows = self.windows.clone();
        windows.push(window);
        self.rebuild(windows, minimized, self.ratio)
    }

    fn perform_custom_action(self: Arc<Self>, action: &LayoutEngineCustomAction) -> EngineRef {
        let Some(verb) = action
            .name
            .strip_prefix(self.name.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
        else {
            return self;
        };

        match verb {
            "promote" => {
                let Some(idx) = action.window.and_then(|w| index_of(&self.windows, w)) else {
                    return self;
                };
                if idx == 0 {
                    return self;
                }
                let mut windows = self.windows.clone();
                let window = windows.remove(idx);
                windows.insert(0, window);
                self.with_windows(windows)
            }
            "set_ratio" => match action.payload.as_f64() {
                Some(ratio) => self.with_ratio(ratio),
                None => self,
            },
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout::test_support::{layout, with_windows};

    fn landscape() -> Rect { Rect::new(0.0, 0.0, 1000.0, 500.0) }

    fn portrait() -> Rect { Rect::new(0.0, 0.0, 500.0, 1000.0) }

    fn engine(position: MasterPosition, handles: &[isize]) -> EngineRef {
        with_windows(MasterStackLayoutEngine::new_ref(0.6, position), handles)
    }

    #[test]
    fn test_single_window_takes_full_rect() {
        let placements = layout(&engine(MasterPosition::Auto, &[1]), landscape());
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].rect, landscape());
    }

    #[test]
    fn test_auto_landscape_puts_master_left() {
        let placements = layout(&engine(MasterPosition::Auto, &[1, 2, 3]), landscape());

        assert!((placements[0].rect.width - 600.0).abs() < 1e-9);
        assert_eq!(placements[0].rect.height, 500.0);
        assert_eq!(placements[1].rect, Rect::new(600.0, 0.0, 400.0, 250.0));
        assert_eq!(placements[2].rect, Rect::new(600.0, 250.0, 400.0, 250.0));
    }

    #[test]
    fn test_auto_portrait_puts_master_top() {
        let placements = layout(&engine(MasterPosition::Auto, &[1, 2, 3]), portrait());

        assert_eq!(placements[0].rect.width, 500.0);
        assert!((placements[0].rect.height - 600.0).abs() < 1e-9);
        assert!(placements[1].rect.x < placements[2].rect.x);
        assert!(placements[1].rect.y > placements[0].rect.y);
    }

    #[test]
    fn test_right_position_mirrors_left() {
        let placements = layout(&engine(MasterPosition::Right, &[1, 2]), landscape());
        assert!(placements[0].rect.x > placements[1].rect.x);
        assert_eq!(placements[1].rect.x, 0.0);
    }

    #[test]
    fn test_focus_between_master_and_stack() {
        let engine = engine(MasterPosition::Left, &[1, 2, 3]);

        let (_, target) = Arc::clone(&engine).focus_window_in_direction(Direction::Right, WindowHandle(1));
        assert_eq!(target, Some(WindowHandle(2)));
        let (_, target) = Arc::clone(&engine).focus_window_in_direction(Direction::Left, WindowHandle(3));
        assert_eq!(target, Some(WindowHandle(1)));
        let (_, target) = Arc::clone(&engine).focus_window_in_direction(Direction::Down, WindowHandle(2));
        assert_eq!(target, Some(WindowHandle(3)));
        let (_, target) = engine.focus_window_in_direction(Direction::Up, WindowHandle(2));
        assert_eq!(target, None);
    }

    #[test]
    fn test_dragging_split_edge_changes_ratio() {
        let engine = engine(MasterPosition::Left, &[1, 2]);
        let wider = Arc::clone(&engine).move_window_edges_in_direction(
            Direction::Right,
            Point::new(0.1, 0.0),
            WindowHandle(1),
        );
        let placements = layout(&wider, landscape());
        assert!((placements[0].rect.width - 700.0).abs() < 1e-9);

        let ignored = Arc::clone(&engine).move_window_edges_in_direction(
            Direction::Left,
            Point::new(0.1, 0.0),
            WindowHandle(1),
        );
        assert!(Arc::ptr_eq(&engine, &ignored));
    }

    #[test]
    fn test_ratio_is_clamped() {
        let engine = engine(MasterPosition::Left, &[1, 2]);
        let action = LayoutEngineCustomAction::new("Master.set_ratio", None).with_payload(serde_json::json!(2.0));
        let clamped = engine.perform_custom_action(&action);
        let placements = layout(&clamped, landscape());
        assert!((placements[0].rect.width - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_promote_moves_window_to_master() {
        let engine = engine(MasterPosition::Left, &[1, 2, 3]);
        let action = LayoutEngineCustomAction::new("Master.promote", Some(WindowHandle(3)));
        let promoted = engine.perform_custom_action(&action);
        assert_eq!(promoted.first_window(), Some(WindowHandle(3)));
    }

    #[test]
    fn test_move_to_master_area() {
        let engine = engine(MasterPosition::Left, &[1, 2, 3]);
        let moved = engine.move_window_to_point(WindowHandle(3), Point::new(0.2, 0.5));
        assert_eq!(moved.first_window(), Some(WindowHandle(3)));
    }

    #[test]
    fn test_auto_portrait_navigation_follows_layout() {
        let engine = engine(MasterPosition::Auto, &[1, 2, 3]);
        let placements = layout(&engine, Rect::new(0.0, 0.0, 1000.0, 2000.0));
        assert!(placements[1].rect.y >= placements[0].rect.bottom());

        let (_, target) = Arc::clone(&engine).focus_window_in_direction(Direction::Down, WindowHandle(1));
        assert_eq!(target, Some(WindowHandle(2)));
        let (_, target) = Arc::clone(&engine).focus_window_in_direction(Direction::Right, WindowHandle(1));
        assert_eq!(target, None);
        let (_, target) = Arc::clone(&engine).focus_window_in_direction(Direction::Right, WindowHandle(2));
        assert_eq!(target, Some(WindowHandle(3)));

        let swapped = Arc::clone(&engine).swap_window_in_direction(Direction::Down, WindowHandle(1));
        assert_eq!(swapped.first_window(), Some(WindowHandle(2)));
    }

    #[test]
    fn test_auto_portrait_edge_move_changes_ratio() {
        let engine = engine(MasterPosition::Auto, &[1, 2]);
        let _ = layout(&engine, portrait());

        let ignored = Arc::clone(&engine).move_window_edges_in_direction(
            Direction::Right,
            Point::new(0.1, 0.1),
            WindowHandle(1),
        );
        assert!(Arc::ptr_eq(&engine, &ignored));

        let taller =
            engine.move_window_edges_in_direction(Direction::Down, Point::new(0.0, 0.1), WindowHandle(1));
        let placements = layout(&taller, portrait());
        assert!((placements[0].rect.height - 700.0).abs() < 1e-9);
    }
}
