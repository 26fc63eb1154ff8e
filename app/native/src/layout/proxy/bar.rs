//! Reserves a strip at the top of the monitor for a status bar.

use std::sync::Arc;

use super::{Proxy, forward_to_inner};
use crate::geometry::Rect;
use crate::layout::{EngineRef, LayoutEngine, LayoutEngineId, Placements};
use crate::model::Monitor;

#[derive(Clone, Debug)]
pub struct BarLayoutEngine {
    identity: LayoutEngineId,
    inner: EngineRef,
    height: f64,
}

impl BarLayoutEngine {
    #[must_use]
    pub fn wrap(inner: EngineRef, height: f64) -> EngineRef {
        Arc::new(Self { identity: LayoutEngineId::new(), inner, height: height.max(0.0) })
    }
}

impl Proxy for BarLayoutEngine {
    fn inner_engine(&self) -> &EngineRef { &self.inner }

    fn with_inner(&self, inner: EngineRef) -> Self { Self { inner, ..self.clone() } }
}

impl LayoutEngine for BarLayoutEngine {
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
        self.inner.do_layout(rect.inset(self.height, 0.0, 0.0, 0.0), monitor)
    }
}
