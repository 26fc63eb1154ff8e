//! Gaps between windows (inner) and around the edges of the monitor (outer).
//!
//! The outer gap shrinks the rectangle handed to the inner engine. The inner gap is
//! split evenly around each normal placement, so two neighbours end up a full inner
//! gap apart.

use std::sync::Arc;

use super::{Proxy, forward_to_inner};
use crate::geometry::Rect;
use crate::layout::{EngineRef, LayoutEngine, LayoutEngineId, Placements, WindowPlacement};
use crate::model::Monitor;
use crate::native::WindowSize;

#[derive(Clone, Debug)]
pub struct GapsLayoutEngine {
    identity: LayoutEngineId,
    inner: EngineRef,
    outer_gap: f64,
    inner_gap: f64,
}

impl GapsLayoutEngine {
    #[must_use]
    pub fn wrap(inner: EngineRef, outer_gap: f64, inner_gap: f64) -> EngineRef {
        Arc::new(Self {
            identity: LayoutEngineId::new(),
            inner,
            outer_gap: outer_gap.max(0.0),
            inner_gap: inner_gap.max(0.0),
        })
    }
}

impl Proxy for GapsLayoutEngine {
    fn inner_engine(&self) -> &EngineRef { &self.inner }

    fn with_inner(&self, inner: EngineRef) -> Self { Self { inner, ..self.clone() } }
}

impl LayoutEngine for GapsLayoutEngine {
    forward_to_inner!(
        name,
        identity,
        count,
        contains_window,
        first_window,
        add_window,
        remove_window,
        move_window_to_point,
        focus_window_in_direction,
        swap_window_in_direction,
        move_window_edges_in_direction,
        minimize_window_start,
        minimize_window_end,
        perform_custom_action,
        inner,
    );

    fn do_layout<'a>(&'a self, rect: Rect, monitor: &'a Monitor) -> Placements<'a> {
        let outer = self.outer_gap;
        let half = self.inner_gap / 2.0;
        let area = rect.inset(outer, outer, outer, outer);

        Box::new(self.inner.do_layout(area, monitor).map(move |placement| match placement.size {
            WindowSize::Normal => WindowPlacement {
                rect: placement.rect.inset(half, half, half, half),
                ..placement
            },
            WindowSize::Minimized | WindowSize::Maximized => placement,
        }))
    }
}
