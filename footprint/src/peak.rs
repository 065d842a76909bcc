use serde::{Deserialize, Serialize};

use crate::math::Point2I;

/// A point of interest (typically a local maximum) inside a footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub x: i32,
    pub y: i32,
    pub value: f32,
}

impl Peak {
    #[inline]
    pub const fn new(x: i32, y: i32, value: f32) -> Self {
        Self { x, y, value }
    }

    #[inline]
    pub fn position(&self) -> Point2I {
        Point2I::new(self.x, self.y)
    }

    #[inline]
    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }
}
