//! Horizontal pixel runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A closed interval `[x0, x1]` of pixels on row `y`.
///
/// Ordering is lexicographic by `(y, x0, x1)`. Construction does not reject
/// `x1 < x0`; such a span has a non-positive [`width`](Span::width) and is
/// refused by [`Footprint`](crate::Footprint) when added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    y: i32,
    x0: i32,
    x1: i32,
}

impl Span {
    #[inline]
    pub const fn new(y: i32, x0: i32, x1: i32) -> Self {
        Self { y, x0, x1 }
    }

    #[inline]
    pub const fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    pub const fn x0(&self) -> i32 {
        self.x0
    }

    #[inline]
    pub const fn x1(&self) -> i32 {
        self.x1
    }

    /// Number of pixels, `x1 - x0 + 1`. Widened so a run spanning the
    /// whole `i32` range does not overflow.
    #[inline]
    pub const fn width(&self) -> i64 {
        self.x1 as i64 - self.x0 as i64 + 1
    }

    #[inline]
    pub const fn is_inverted(&self) -> bool {
        self.x1 < self.x0
    }

    #[inline]
    pub const fn contains(&self, x: i32) -> bool {
        x >= self.x0 && x <= self.x1
    }

    #[inline]
    pub const fn contains_point(&self, x: i32, y: i32) -> bool {
        self.contains(x) && y == self.y
    }

    #[inline]
    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.x0 += dx;
        self.x1 += dx;
        self.y += dy;
    }

    /// Column coordinates covered by the span, left to right.
    #[inline]
    pub fn xs(&self) -> std::ops::RangeInclusive<i32> {
        self.x0..=self.x1
    }

    /// True when `self` can follow `prev` in canonical (normalized) order:
    /// a later row, or the same row starting at least one pixel past a gap.
    #[inline]
    pub(crate) fn follows(&self, prev: &Span) -> bool {
        self.y > prev.y || (self.y == prev.y && i64::from(self.x0) > i64::from(prev.x1) + 1)
    }

    /// Portion of the span inside columns `[x_min, x_max]`.
    #[inline]
    pub(crate) fn clipped(&self, x_min: i32, x_max: i32) -> Option<Span> {
        let x0 = self.x0.max(x_min);
        let x1 = self.x1.min(x_max);
        (x0 <= x1).then_some(Span::new(self.y, x0, x1))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}..{}", self.y, self.x0, self.x1)
    }
}

/// Sort `spans` by `(y, x0)` and merge overlapping or touching runs on each row.
pub(crate) fn normalize_spans(spans: &mut Vec<Span>) {
    spans.sort_unstable();

    let mut write = 0;
    for read in 0..spans.len() {
        let span = spans[read];
        if write > 0 {
            let last = &mut spans[write - 1];
            if last.y == span.y && i64::from(last.x1) + 1 >= i64::from(span.x0) {
                last.x1 = last.x1.max(span.x1);
                continue;
            }
        }
        spans[write] = span;
        write += 1;
    }
    spans.truncate(write);
}

/// Membership test on spans in canonical order, by binary search.
pub(crate) fn sorted_contains(spans: &[Span], x: i32, y: i32) -> bool {
    let idx = spans.partition_point(|s| (s.y, s.x1) < (y, x));
    spans.get(idx).is_some_and(|s| s.contains_point(x, y))
}

/// Total pixel count of `spans`.
pub(crate) fn spans_area(spans: &[Span]) -> usize {
    spans.iter().map(|s| s.width().max(0) as usize).sum()
}
