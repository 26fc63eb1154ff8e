//! Monitors and topology diffing.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::geometry::Rect;
use crate::native::{MonitorHandle, MonitorInfo};

/// A tracked display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Monitor {
    pub handle: MonitorHandle,
    pub device_name: String,
    pub bounds: Rect,
    pub working_area: Rect,
    /// Scale factor in percent.
    pub scale_factor: u32,
    pub is_primary: bool,
}

impl Monitor {
    /// Two monitors are the same display when their bounds match. Handles may be
    /// reissued by the OS on topology changes.
    #[must_use]
    pub fn same_geometry(&self, other: &Self) -> bool { self.bounds == other.bounds }
}

impl From<MonitorInfo> for Monitor {
    fn from(info: MonitorInfo) -> Self {
        Self {
            handle: info.handle,
            device_name: info.device_name,
            bounds: info.bounds,
            working_area: info.working_area,
            scale_factor: info.scale_factor,
            is_primary: info.is_primary,
        }
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.device_name, self.bounds)
    }
}

/// Sorts monitors left to right, then top to bottom.
///
/// Indices into the sorted list stay stable across re-enumeration as long as the
/// physical arrangement does not change.
pub fn sort_monitors(monitors: &mut [Monitor]) {
    monitors.sort_by(|a, b| match a.bounds.x.total_cmp(&b.bounds.x) {
        Ordering::Equal => a.bounds.y.total_cmp(&b.bounds.y),
        other => other,
    });
}

/// The result of comparing two enumerations of the display topology.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MonitorDiff {
    /// Monitors only present in the new enumeration.
    pub added: Vec<Monitor>,
    /// Monitors only present in the old enumeration.
    pub removed: Vec<Monitor>,
    /// Monitors present in both, as found in the new enumeration.
    pub unchanged: Vec<Monitor>,
    /// `(old, new)` handle pairs for unchanged monitors whose handle was reissued.
    #[serde(skip)]
    pub reissued: Vec<(MonitorHandle, MonitorHandle)>,
}

impl MonitorDiff {
    /// Diffs `previous` against `current` by geometry.
    ///
    /// Each old monitor is matched with at most one new monitor, so mirrored displays
    /// with identical bounds are paired off in order.
    #[must_use]
    pub fn compute(previous: &[Monitor], current: &[Monitor]) -> Self {
        let mut matched = vec![false; current.len()];
        let mut diff = Self::default();

        for old in previous {
            let found = current
                .iter()
                .enumerate()
                .find(|(idx, new)| !matched[*idx] && new.same_geometry(old))
                .map(|(idx, _)| idx);

            match found {
                Some(idx) => {
                    matched[idx] = true;
                    let new = &current[idx];
                    if new.handle != old.handle {
                        diff.reissued.push((old.handle, new.handle));
                    }
                    diff.unchanged.push(new.clone());
                }
                None => diff.removed.push(old.clone()),
            }
        }

        diff.added = current
            .iter()
            .zip(matched)
            .filter(|(_, was_matched)| !was_matched)
            .map(|(monitor, _)| monitor.clone())
            .collect();

        diff
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.added.is_empty() && self.removed.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(handle: isize, x: f64, y: f64) -> Monitor {
        Monitor {
            handle: MonitorHandle(handle),
            device_name: format!("DISPLAY{handle}"),
            bounds: Rect::new(x, y, 1920.0, 1080.0),
            working_area: Rect::new(x, y, 1920.0, 1040.0),
            scale_factor: 100,
            is_primary: handle == 1,
        }
    }

    #[test]
    fn test_sort_is_by_x_then_y() {
        let mut monitors = vec![monitor(3, 1920.0, 0.0), monitor(2, 0.0, 1080.0), monitor(1, 0.0, 0.0)];
        sort_monitors(&mut monitors);
        let handles: Vec<_> = monitors.iter().map(|m| m.handle.0).collect();
        assert_eq!(handles, vec![1, 2, 3]);
    }

    #[test]
    fn test_diff_matches_by_geometry_not_handle() {
        let previous = vec![monitor(1, 0.0, 0.0), monitor(2, 1920.0, 0.0)];
        let current = vec![monitor(10, 0.0, 0.0), monitor(11, 3840.0, 0.0)];

        let diff = MonitorDiff::compute(&previous, &current);
        assert_eq!(diff.unchanged, vec![monitor(10, 0.0, 0.0)]);
        assert_eq!(diff.removed, vec![monitor(2, 1920.0, 0.0)]);
        assert_eq!(diff.added, vec![monitor(11, 3840.0, 0.0)]);
        assert_eq!(diff.reissued, vec![(MonitorHandle(1), MonitorHandle(10))]);
    }

    #[test]
    fn test_diff_partitions_union() {
        let previous = vec![monitor(1, 0.0, 0.0), monitor(2, 1920.0, 0.0), monitor(3, 0.0, 1080.0)];
        let current = vec![monitor(2, 1920.0, 0.0), monitor(4, 3840.0, 0.0)];

        let diff = MonitorDiff::compute(&previous, &current);
        let total = diff.added.len() + diff.removed.len() + diff.unchanged.len();

        // |A ∪ B| by geometry: (0,0), (1920,0), (0,1080), (3840,0)
        assert_eq!(total, 4);
        assert!(diff.unchanged.iter().all(|m| previous.iter().any(|p| p.same_geometry(m))));
        assert!(diff.added.iter().all(|m| !previous.iter().any(|p| p.same_geometry(m))));
        assert!(diff.removed.iter().all(|m| !current.iter().any(|c| c.same_geometry(m))));
    }

    #[test]
    fn test_identical_topology_is_empty_diff() {
        let monitors = vec![monitor(1, 0.0, 0.0)];
        let diff = MonitorDiff::compute(&monitors, &monitors);
        assert!(diff.is_empty());
        assert_eq!(diff.unchanged.len(), 1);
        assert!(diff.reissued.is_empty());
    }

    #[test]
    fn test_mirrored_monitors_pair_off_once() {
        let previous = vec![monitor(1, 0.0, 0.0)];
        let current = vec![monitor(1, 0.0, 0.0), monitor(2, 0.0, 0.0)];

        let diff = MonitorDiff::compute(&previous, &current);
        assert_eq!(diff.unchanged.len(), 1);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].handle, MonitorHandle(2));
    }
}
