//! Proxy engines that wrap another engine.
//!
//! A proxy forwards every call to its inner engine and rewraps the result. When the
//! inner engine comes back unchanged the proxy returns itself, so no-op stability
//! holds through the whole chain.

pub mod bar;
pub mod floating;
pub mod gaps;

use std::sync::Arc;

pub use bar::BarLayoutEngine;
pub use floating::FloatingLayoutEngine;
pub use gaps::GapsLayoutEngine;

use super::{EngineRef, LayoutEngine};

/// A wrapper around exactly one inner engine.
pub trait Proxy: LayoutEngine + Sized + 'static {
    fn inner_engine(&self) -> &EngineRef;

    /// A copy of this proxy around `inner`.
    fn with_inner(&self, inner: EngineRef) -> Self;
}

/// Returns `this` when `updated` is its current inner engine, else a rewrapped copy.
pub fn rewrap<P: Proxy>(this: Arc<P>, updated: EngineRef) -> EngineRef {
    if Arc::ptr_eq(this.inner_engine(), &updated) {
        this
    } else {
        Arc::new(this.with_inner(updated))
    }
}

/// Implements the [`LayoutEngine`] methods a proxy passes straight through.
///
/// Each listed method forwards to the inner engine and goes through [`rewrap`].
macro_rules! forward_to_inner {
    ($($method:ident),* $(,)?) => {
        $( forward_to_inner!(@method $method); )*
    };
    (@method name) => {
        fn name(&self) -> &str { self.inner_engine().name() }
    };
    (@method identity) => {
        fn identity(&self) -> $crate::layout::LayoutEngineId { self.identity }
    };
    (@method count) => {
        fn count(&self) -> usize { self.inner_engine().count() }
    };
    (@method contains_window) => {
        fn contains_window(&self, window: $crate::native::WindowHandle) -> bool {
            self.inner_engine().contains_window(window)
        }
    };
    (@method first_window) => {
        fn first_window(&self) -> Option<$crate::native::WindowHandle> { self.inner_engine().first_window() }
    };
    (@method add_window) => {
        fn add_window(self: ::std::sync::Arc<Self>, window: $crate::native::WindowHandle) -> $crate::layout::EngineRef {
            let updated = ::std::sync::Arc::clone(self.inner_engine()).add_window(window);
            $crate::layout::proxy::rewrap(self, updated)
        }
    };
    (@method remove_window) => {
        fn remove_window(self: ::std::sync::Arc<Self>, window: $crate::native::WindowHandle) -> $crate::layout::EngineRef {
            let updated = ::std::sync::Arc::clone(self.inner_engine()).remove_window(window);
            $crate::layout::proxy::rewrap(self, updated)
        }
    };
    (@method move_window_to_point) => {
        fn move_window_to_point(
            self: ::std::sync::Arc<Self>,
            window: $crate::native::WindowHandle,
            point: $crate::geometry::Point,
        ) -> $crate::layout::EngineRef {
            let updated = ::std::sync::Arc::clone(self.inner_engine()).move_window_to_point(window, point);
            $crate::layout::proxy::rewrap(self, updated)
        }
    };
    (@method focus_window_in_direction) => {
        fn focus_window_in_direction(
            self: ::std::sync::Arc<Self>,
            direction: $crate::geometry::Direction,
            window: $crate::native::WindowHandle,
        ) -> ($crate::layout::EngineRef, Option<$crate::native::WindowHandle>) {
            let (updated, target) = ::std::sync::Arc::clone(self.inner_engine()).focus_window_in_direction(direction, window);
            ($crate::layout::proxy::rewrap(self, updated), target)
        }
    };
    (@method swap_window_in_direction) => {
        fn swap_window_in_direction(
            self: ::std::sync::Arc<Self>,
            direction: $crate::geometry::Direction,
            window: $crate::native::WindowHandle,
        ) -> $crate::layout::EngineRef {
            let updated = ::std::sync::Arc::clone(self.inner_engine()).swap_window_in_direction(direction, window);
            $crate::layout::proxy::rewrap(self, updated)
        }
    };
    (@method move_window_edges_in_direction) => {
        fn move_window_edges_in_direction(
            self: ::std::sync::Arc<Self>,
            edge: $crate::geometry::Direction,
            deltas: $crate::geometry::Point,
            window: $crate::native::WindowHandle,
        ) -> $crate::layout::EngineRef {
            let updated = ::std::sync::Arc::clone(self.inner_engine()).move_window_edges_in_direction(edge, deltas, window);
            $crate::layout::proxy::rewrap(self, updated)
        }
    };
    (@method minimize_window_start) => {
        fn minimize_window_start(self: ::std::sync::Arc<Self>, window: $crate::native::WindowHandle) -> $crate::layout::EngineRef {
            let updated = ::std::sync::Arc::clone(self.inner_engine()).minimize_window_start(window);
            $crate::layout::proxy::rewrap(self, updated)
        }
    };
    (@method minimize_window_end) => {
        fn minimize_window_end(self: ::std::sync::Arc<Self>, window: $crate::native::WindowHandle) -> $crate::layout::EngineRef {
            let updated = ::std::sync::Arc::clone(self.inner_engine()).minimize_window_end(window);
            $crate::layout::proxy::rewrap(self, updated)
        }
    };
    (@method perform_custom_action) => {
        fn perform_custom_action(
            self: ::std::sync::Arc<Self>,
            action: &$crate::layout::LayoutEngineCustomAction,
        ) -> $crate::layout::EngineRef {
            let updated = ::std::sync::Arc::clone(self.inner_engine()).perform_custom_action(action);
            $crate::layout::proxy::rewrap(self, updated)
        }
    };
    (@method inner) => {
        fn inner(&self) -> Option<&$crate::layout::EngineRef> { Some(self.inner_engine()) }
    };
}

pub(crate) use forward_to_inner;
