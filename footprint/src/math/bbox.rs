//! Axis-aligned integer bounding box for pixel regions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box with signed `i32` coordinates.
///
/// Uses inclusive bounds: a pixel at (x, y) is inside if
/// `x_min <= x <= x_max` and `y_min <= y <= y_max`.
/// A box with `x_min > x_max` or `y_min > y_max` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Box2I {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl Default for Box2I {
    fn default() -> Self {
        Self::empty()
    }
}

impl Box2I {
    #[inline]
    pub const fn new(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Box with its lower-left corner at `(x0, y0)` covering `width` x `height` pixels.
    ///
    /// Zero width or height gives an empty box.
    pub fn from_corner_size(x0: i32, y0: i32, width: usize, height: usize) -> Self {
        if width == 0 || height == 0 {
            return Self::empty();
        }
        Self {
            x_min: x0,
            x_max: x0 + width as i32 - 1,
            y_min: y0,
            y_max: y0 + height as i32 - 1,
        }
    }

    /// Create an empty bounding box (for accumulation).
    ///
    /// The empty box has inverted bounds so that any point
    /// included via `include()` will set the initial bounds.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            x_min: i32::MAX,
            x_max: i32::MIN,
            y_min: i32::MAX,
            y_max: i32::MIN,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    /// Expand this bounding box to include the given point.
    #[inline]
    pub fn include(&mut self, x: i32, y: i32) {
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
    }

    /// Expand this bounding box to include every pixel of `other`.
    #[inline]
    pub fn include_box(&mut self, other: &Box2I) {
        if other.is_empty() {
            return;
        }
        self.include(other.x_min, other.y_min);
        self.include(other.x_max, other.y_max);
    }

    /// Number of columns; zero for an empty box.
    #[inline]
    pub const fn width(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.x_max as i64 - self.x_min as i64 + 1) as usize
        }
    }

    /// Number of rows; zero for an empty box.
    #[inline]
    pub const fn height(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.y_max as i64 - self.y_min as i64 + 1) as usize
        }
    }

    #[inline]
    pub const fn area(&self) -> usize {
        self.width() * self.height()
    }

    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// True when every pixel of `other` lies inside `self`. An empty `other`
    /// is contained in anything.
    #[inline]
    pub const fn contains_box(&self, other: &Box2I) -> bool {
        other.is_empty()
            || (self.contains(other.x_min, other.y_min) && self.contains(other.x_max, other.y_max))
    }

    /// Overlap of two boxes; empty when they are disjoint.
    pub fn intersection(&self, other: &Box2I) -> Box2I {
        let clipped = Box2I {
            x_min: self.x_min.max(other.x_min),
            x_max: self.x_max.min(other.x_max),
            y_min: self.y_min.max(other.y_min),
            y_max: self.y_max.min(other.y_max),
        };
        if clipped.is_empty() {
            Box2I::empty()
        } else {
            clipped
        }
    }

    /// Translate by `(dx, dy)`. Empty boxes stay empty.
    #[inline]
    pub fn shift(&mut self, dx: i32, dy: i32) {
        if self.is_empty() {
            return;
        }
        self.x_min += dx;
        self.x_max += dx;
        self.y_min += dy;
        self.y_max += dy;
    }

    /// Box expanded by `margin` pixels on every side.
    pub fn grown(&self, margin: i32) -> Box2I {
        if self.is_empty() {
            return *self;
        }
        let grown = Box2I {
            x_min: self.x_min.saturating_sub(margin),
            x_max: self.x_max.saturating_add(margin),
            y_min: self.y_min.saturating_sub(margin),
            y_max: self.y_max.saturating_add(margin),
        };
        if grown.is_empty() {
            Box2I::empty()
        } else {
            grown
        }
    }
}

impl fmt::Display for Box2I {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "(empty)")
        } else {
            write!(
                f,
                "(x: {}..={}, y: {}..={})",
                self.x_min, self.x_max, self.y_min, self.y_max
            )
        }
    }
}
