//! Geometry values passed to and read back from the automation object.

use std::fmt;

/// A screen or window coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Width and height of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A rectangle described by its top-left and bottom-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    /// Build a rectangle from its origin and size. The far corner saturates
    /// at the `i32` bounds; use [`checked_new`](Rect::checked_new) for input
    /// that is not trusted.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x.saturating_add(width),
            y2: y.saturating_add(height),
        }
    }

    /// Like [`new`](Rect::new), but `None` when the far corner does not fit
    /// in an `i32`.
    pub const fn checked_new(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        match (x.checked_add(width), y.checked_add(height)) {
            (Some(x2), Some(y2)) => Some(Self::from_corners(x, y, x2, y2)),
            _ => None,
        }
    }

    /// Build a rectangle from two corner coordinates.
    pub const fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub const fn top_left(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub const fn bottom_right(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Extent of the rectangle, saturating at the `i32` bounds.
    pub const fn size(&self) -> Size {
        Size::new(
            self.x2.saturating_sub(self.x1),
            self.y2.saturating_sub(self.y1),
        )
    }
}
