//! Helper functions for layout calculations.
//!
//! Provides split operations and the small index helpers shared by the engines.

use crate::geometry::{Direction, Rect};
use crate::native::WindowHandle;

/// Splits a frame horizontally (left/right) at the given ratio with a gap.
///
/// Returns `(left, right)`, where `ratio` is the left portion.
#[must_use]
pub fn split_horizontal(frame: &Rect, ratio: f64, gap: f64) -> (Rect, Rect) {
    let available_width = frame.width - gap;
    let left_width = available_width * ratio;
    let right_width = available_width - left_width;

    let left = Rect::new(frame.x, frame.y, left_width, frame.height);
    let right = Rect::new(frame.x + left_width + gap, frame.y, right_width, frame.height);

    (left, right)
}

/// Splits a frame vertically (top/bottom) at the given ratio with a gap.
///
/// Returns `(top, bottom)`, where `ratio` is the top portion.
#[must_use]
pub fn split_vertical(frame: &Rect, ratio: f64, gap: f64) -> (Rect, Rect) {
    let available_height = frame.height - gap;
    let top_height = available_height * ratio;
    let bottom_height = available_height - top_height;

    let top = Rect::new(frame.x, frame.y, frame.width, top_height);
    let bottom = Rect::new(frame.x, frame.y + top_height + gap, frame.width, bottom_height);

    (top, bottom)
}

/// The `index`-th of `count` equal slices of `frame`.
///
/// Horizontal slices are columns, vertical slices are rows.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn slice(frame: &Rect, index: usize, count: usize, horizontal: bool) -> Rect {
    if count == 0 {
        return *frame;
    }

    if horizontal {
        let width = frame.width / count as f64;
        Rect::new((index as f64).mul_add(width, frame.x), frame.y, width, frame.height)
    } else {
        let height = frame.height / count as f64;
        Rect::new(frame.x, (index as f64).mul_add(height, frame.y), frame.width, height)
    }
}

/// Position of `window` in `windows`.
#[must_use]
pub fn index_of(windows: &[WindowHandle], window: WindowHandle) -> Option<usize> {
    windows.iter().position(|w| *w == window)
}

/// Signed step through a list for `direction`, honouring the list orientation.
///
/// Returns `None` for directions that do not run along the list.
#[must_use]
pub const fn step(direction: Direction, horizontal: bool, forward_is_right: bool) -> Option<isize> {
    match (direction, horizontal) {
        (Direction::Left, true) => Some(if forward_is_right { -1 } else { 1 }),
        (Direction::Right, true) => Some(if forward_is_right { 1 } else { -1 }),
        (Direction::Up, false) => Some(-1),
        (Direction::Down, false) => Some(1),
        _ => None,
    }
}
