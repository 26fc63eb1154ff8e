//! Geometry primitives shared by the store, the layout engines and the native layer.
//!
//! All coordinates are in virtual-screen pixels as `f64`. Conversion to the integer
//! coordinates the OS expects happens only at the native boundary.
//!
//! "Unit square" coordinates express a point or rectangle relative to a reference
//! rectangle, where `(0, 0)` is the reference's top-left corner and `(1, 1)` its
//! bottom-right corner. They let positions survive a change of resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Point
// ============================================================================

/// A point in screen coordinates, or in unit-square coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle with position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a zero-sized rectangle at origin.
    #[must_use]
    pub const fn zero() -> Self { Self::new(0.0, 0.0, 0.0, 0.0) }

    /// The unit square, `(0, 0, 1, 1)`.
    #[must_use]
    pub const fn unit() -> Self { Self::new(0.0, 0.0, 1.0, 1.0) }

    /// Check if this rectangle has valid dimensions.
    #[must_use]
    pub fn is_valid(&self) -> bool { self.width > 0.0 && self.height > 0.0 }

    /// Check if this rectangle contains a point.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// Calculate the area of this rectangle.
    #[must_use]
    pub fn area(&self) -> f64 { self.width * self.height }

    /// Get the center point of this rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn right(&self) -> f64 { self.x + self.width }

    #[must_use]
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Check if two rectangles are approximately equal (within epsilon).
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.width - other.width).abs() < epsilon
            && (self.height - other.height).abs() < epsilon
    }

    /// Shrinks the rectangle by the given amount on each side.
    ///
    /// Negative results are clamped to a zero size.
    #[must_use]
    pub fn inset(&self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(0.0),
            (self.height - top - bottom).max(0.0),
        )
    }

    /// Translates a screen point into this rectangle's local coordinates.
    #[must_use]
    pub fn to_local(&self, point: Point) -> Point { Point::new(point.x - self.x, point.y - self.y) }

    /// Normalizes a point local to this rectangle into the unit square.
    ///
    /// With `respect_sign` the sign of the input is kept, which is what deltas need.
    /// Otherwise the absolute value is taken.
    #[must_use]
    pub fn point_to_unit_square(&self, point: Point, respect_sign: bool) -> Point {
        if !self.is_valid() {
            return Point::default();
        }

        let x = point.x / self.width;
        let y = point.y / self.height;
        if respect_sign { Point::new(x, y) } else { Point::new(x.abs(), y.abs()) }
    }

    /// Normalizes `inner`, given in screen coordinates, into this rectangle's unit square.
    #[must_use]
    pub fn rect_to_unit_square(&self, inner: &Self) -> Self {
        if !self.is_valid() {
            return Self::zero();
        }

        Self::new(
            (inner.x - self.x) / self.width,
            (inner.y - self.y) / self.height,
            inner.width / self.width,
            inner.height / self.height,
        )
    }

    /// Scales a unit-square rectangle back into screen coordinates within this rectangle.
    #[must_use]
    pub fn rect_from_unit_square(&self, unit: &Self) -> Self {
        Self::new(
            unit.x.mul_add(self.width, self.x),
            unit.y.mul_add(self.height, self.y),
            unit.width * self.width,
            unit.height * self.height,
        )
    }

    /// Rounds to integer pixel coordinates `(x, y, width, height)`.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn to_pixels(&self) -> (i32, i32, i32, i32) {
        (
            self.x.round() as i32,
            self.y.round() as i32,
            self.width.round() as i32,
            self.height.round() as i32,
        )
    }

    /// Adds each component of `offset` to this rectangle.
    ///
    /// Used to compensate for invisible window borders.
    #[must_use]
    pub fn offset_by(&self, offset: &Self) -> Self {
        Self::new(
            self.x + offset.x,
            self.y + offset.y,
            self.width + offset.width,
            self.height + offset.height,
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {} {}x{}]", self.x, self.y, self.width, self.height)
    }
}

// ============================================================================
// Direction
// ============================================================================

/// A cardinal direction, used for focus/swap navigation and edge resizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Whether the direction runs along the x axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool { matches!(self, Self::Left | Self::Right) }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Euclidean modulo for list indices that wrap around in both directions.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
#[must_use]
pub const fn wrap_index(index: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    index.rem_euclid(len as isize) as usize
}
