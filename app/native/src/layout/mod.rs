//! Layout engine chain.
//!
//! A layout engine is an immutable value that turns a rectangle into window
//! placements for one workspace. Engines compose: a proxy engine wraps an inner
//! engine and adjusts the rectangle or the placements around the delegated call.
//!
//! ```text
//! ┌────────────── BarLayoutEngine ──────────────┐
//! │ reserves the bar strip, delegates the rest  │
//! │ ┌────────── GapsLayoutEngine ─────────────┐ │
//! │ │ outer gap on the rect, inner gap per    │ │
//! │ │ window                                  │ │
//! │ │ ┌──────── FloatingLayoutEngine ───────┐ │ │
//! │ │ │ floating windows keep their rect    │ │ │
//! │ │ │ ┌─ Column / Focus / Master / Tree ┐ │ │ │
//! │ │ │ │ tiles the remaining windows     │ │ │ │
//! │ │ │ └─────────────────────────────────┘ │ │ │
//! │ │ └─────────────────────────────────────┘ │ │
//! │ └─────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Persistence
//!
//! Every mutator consumes an `Arc<Self>` and returns an [`EngineRef`]. When a call
//! changes nothing the engine returns the very same `Arc`, and proxies return
//! themselves when their inner engine came back unchanged. `Arc::ptr_eq` is therefore
//! a complete "did anything change" test for the store.
//!
//! # Custom actions
//!
//! Operations outside the common contract travel as a [`LayoutEngineCustomAction`].
//! Each engine handles the names it owns and passes everything else inward.

pub mod column;
pub mod focus;
pub mod helpers;
pub mod master;
pub mod proxy;
pub mod tree;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Direction, Point, Rect};
use crate::model::Monitor;
use crate::native::{WindowHandle, WindowPosition, WindowSize};

pub use column::ColumnLayoutEngine;
pub use focus::FocusLayoutEngine;
pub use master::MasterStackLayoutEngine;
pub use proxy::{BarLayoutEngine, FloatingLayoutEngine, GapsLayoutEngine};
pub use tree::TreeLayoutEngine;

/// Shared handle to an immutable engine.
pub type EngineRef = Arc<dyn LayoutEngine>;

/// Lazy, restartable sequence of placements.
pub type Placements<'a> = Box<dyn Iterator<Item = WindowPlacement> + 'a>;

/// Identity shared by every version of one engine.
///
/// Mutators keep the identity, so it can be used to find "the same engine" after
/// any number of updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutEngineId(Uuid);

impl LayoutEngineId {
    #[must_use]
    pub fn new() -> Self { Self(Uuid::now_v7()) }
}

impl Default for LayoutEngineId {
    fn default() -> Self { Self::new() }
}

/// Where one window goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowPlacement {
    pub window: WindowHandle,
    pub rect: Rect,
    pub size: WindowSize,
}

impl WindowPlacement {
    #[must_use]
    pub const fn normal(window: WindowHandle, rect: Rect) -> Self {
        Self { window, rect, size: WindowSize::Normal }
    }

    #[must_use]
    pub const fn to_position(&self) -> WindowPosition {
        WindowPosition { handle: self.window, rect: self.rect, size: self.size }
    }
}

/// An engine-specific operation, addressed by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutEngineCustomAction {
    pub name: String,
    #[serde(default)]
    pub window: Option<WindowHandle>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl LayoutEngineCustomAction {
    #[must_use]
    pub fn new(name: impl Into<String>, window: Option<WindowHandle>) -> Self {
        Self { name: name.into(), window, payload: serde_json::Value::Null }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// A tiling algorithm plus its immutable state.
pub trait LayoutEngine: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn identity(&self) -> LayoutEngineId;

    /// Number of windows tracked, including minimized and floating ones.
    fn count(&self) -> usize;

    fn contains_window(&self, window: WindowHandle) -> bool;

    fn first_window(&self) -> Option<WindowHandle>;

    /// Computes placements for `rect` on `monitor`. Calling it twice on the same
    /// engine with the same inputs yields the same sequence.
    fn do_layout<'a>(&'a self, rect: Rect, monitor: &'a Monitor) -> Placements<'a>;

    fn add_window(self: Arc<Self>, window: WindowHandle) -> EngineRef;

    fn remove_window(self: Arc<Self>, window: WindowHandle) -> EngineRef;

    /// Adds or moves `window` to a point given in unit-square coordinates.
    fn move_window_to_point(self: Arc<Self>, window: WindowHandle, point: Point) -> EngineRef;

    /// Returns the new engine and the window that should receive focus, if any.
    fn focus_window_in_direction(
        self: Arc<Self>,
        direction: Direction,
        window: WindowHandle,
    ) -> (EngineRef, Option<WindowHandle>);

    fn swap_window_in_direction(self: Arc<Self>, direction: Direction, window: WindowHandle) -> EngineRef;

    /// Moves the `edge` of `window` by `deltas`, given in unit-square coordinates.
    fn move_window_edges_in_direction(
        self: Arc<Self>,
        edge: Direction,
        deltas: Point,
        window: WindowHandle,
    ) -> EngineRef;

    fn minimize_window_start(self: Arc<Self>, window: WindowHandle) -> EngineRef;

    fn minimize_window_end(self: Arc<Self>, window: WindowHandle) -> EngineRef;

    fn perform_custom_action(self: Arc<Self>, action: &LayoutEngineCustomAction) -> EngineRef;

    /// The wrapped engine, for proxies.
    fn inner(&self) -> Option<&EngineRef> { None }
}

/// Walks a proxy chain from the outermost engine inward.
pub fn chain(engine: &EngineRef) -> impl Iterator<Item = &EngineRef> {
    std::iter::successors(Some(engine), |current| current.inner())
}

/// The innermost engine of a chain.
#[must_use]
pub fn innermost(engine: &EngineRef) -> &EngineRef {
    chain(engine).last().unwrap_or(engine)
}
