//! Monitor queries.

use std::sync::Arc;

use crate::geometry::{Point, wrap_index};
use crate::model::Monitor;
use crate::native::MonitorHandle;
use crate::store::error::{StoreError, StoreResult};
use crate::store::sectors::RootSector;

fn by_handle(root: &RootSector, handle: MonitorHandle) -> StoreResult<Monitor> {
    root.monitors.get(handle).cloned().ok_or(StoreError::MonitorNotFound(handle))
}

/// Every monitor, sorted left to right then top to bottom.
#[must_use]
pub fn all_monitors(root: &RootSector) -> Arc<[Monitor]> { root.monitors.shared() }

/// The monitor holding the focused window.
///
/// # Errors
///
/// Fails only before the first topology scan.
pub fn active_monitor(root: &RootSector) -> StoreResult<Monitor> {
    by_handle(root, root.monitors.active_handle())
}

/// # Errors
///
/// Fails only before the first topology scan.
pub fn primary_monitor(root: &RootSector) -> StoreResult<Monitor> {
    by_handle(root, root.monitors.primary_handle())
}

/// The last monitor on which a tracked window had focus.
///
/// # Errors
///
/// Fails only before the first topology scan.
pub fn last_active_monitor(root: &RootSector) -> StoreResult<Monitor> {
    by_handle(root, root.monitors.last_active_handle())
}

pub fn monitor_by_handle(handle: MonitorHandle) -> impl Fn(&RootSector) -> StoreResult<Monitor> {
    move |root| by_handle(root, handle)
}

pub fn monitor_by_index(index: usize) -> impl Fn(&RootSector) -> StoreResult<Monitor> {
    move |root| root.monitors.monitors().get(index).cloned().ok_or(StoreError::MonitorIndexOutOfRange(index))
}

/// The next (or previous, with `reverse`) monitor, wrapping around. `None` means the
/// active monitor.
pub fn adjacent_monitor(
    handle: Option<MonitorHandle>,
    reverse: bool,
) -> impl Fn(&RootSector) -> StoreResult<Monitor> {
    move |root| {
        let handle = handle.unwrap_or_else(|| root.monitors.active_handle());
        let monitors = root.monitors.monitors();
        let index = root.monitors.index_of(handle).ok_or(StoreError::MonitorNotFound(handle))?;

        let delta = if reverse { -1 } else { 1 };
        #[allow(clippy::cast_possible_wrap)]
        let next = wrap_index(index as isize + delta, monitors.len());
        Ok(monitors[next].clone())
    }
}

/// The monitor containing `point`, else the one whose centre is nearest.
pub fn monitor_at_point(point: Point) -> impl Fn(&RootSector) -> StoreResult<Monitor> {
    move |root| {
        let monitors = root.monitors.monitors();
        if let Some(monitor) = monitors.iter().find(|m| m.bounds.contains_point(point)) {
            return Ok(monitor.clone());
        }

        monitors
            .iter()
            .min_by(|a, b| distance_sq(a.bounds.center(), point).total_cmp(&distance_sq(b.bounds.center(), point)))
            .cloned()
            .ok_or(StoreError::NoAdjacent("monitor"))
    }
}

fn distance_sq(a: Point, b: Point) -> f64 {
    let (dx, dy) = (a.x - b.x, a.y - b.y);
    dx.mul_add(dx, dy * dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::fake::FakeNative;

    fn root() -> RootSector {
        let mut root = RootSector::default();
        root.monitors.set_monitors(vec![
            FakeNative::monitor(1, 0.0, 0.0, true).into(),
            FakeNative::monitor(2, 1920.0, 0.0, false).into(),
            FakeNative::monitor(3, 3840.0, 0.0, false).into(),
        ]);
        root.monitors.set_active(MonitorHandle(1));
        root
    }

    #[test]
    fn test_adjacent_monitor_wraps() {
        let root = root();
        assert_eq!(adjacent_monitor(None, false)(&root).unwrap().handle, MonitorHandle(2));
        assert_eq!(adjacent_monitor(None, true)(&root).unwrap().handle, MonitorHandle(3));
        assert_eq!(adjacent_monitor(Some(MonitorHandle(3)), false)(&root).unwrap().handle, MonitorHandle(1));
        assert!(adjacent_monitor(Some(MonitorHandle(9)), false)(&root).is_err());
    }

    #[test]
    fn test_monitor_at_point_prefers_containing_monitor() {
        let root = root();
        assert_eq!(monitor_at_point(Point::new(2000.0, 500.0))(&root).unwrap().handle, MonitorHandle(2));
        assert_eq!(monitor_at_point(Point::new(9000.0, 500.0))(&root).unwrap().handle, MonitorHandle(3));
    }

    #[test]
    fn test_monitor_by_index() {
        let root = root();
        assert_eq!(monitor_by_index(1)(&root).unwrap().handle, MonitorHandle(2));
        assert!(matches!(monitor_by_index(3)(&root), Err(StoreError::MonitorIndexOutOfRange(3))));
    }
}
