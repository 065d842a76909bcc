//! Resampling footprints between pixel frames.
//!
//! A frame maps its pixel coordinates to a shared sky coordinate system and
//! back. Moving a footprint from one frame to another is done by pulling
//! every candidate target pixel back into the source frame and keeping it
//! when it lands on a source pixel, so arbitrary non-linear mappings work and
//! a single source span may turn into several disjoint target runs.


use glam::{DMat2, DVec2};

use crate::error::{Error, Result};
use crate::footprint::Footprint;
use crate::math::{Box2I, Point2I};
use crate::span::{normalize_spans, sorted_contains, Span};

/// A pixel grid registered to sky coordinates.
pub trait PixelFrame {
    fn pixel_to_sky(&self, pixel: DVec2) -> DVec2;
    fn sky_to_pixel(&self, sky: DVec2) -> DVec2;
}

/// Map a pixel position in `source` to the matching position in `target`.
#[inline]
pub fn map_point<S, T>(source: &S, target: &T, point: DVec2) -> DVec2
where
    S: PixelFrame + ?Sized,
    T: PixelFrame + ?Sized,
{
    target.sky_to_pixel(source.pixel_to_sky(point))
}

/// Linear frame: `sky = matrix * pixel + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineFrame {
    matrix: DMat2,
    offset: DVec2,
    inverse: DMat2,
}

impl AffineFrame {
    pub fn new(matrix: DMat2, offset: DVec2) -> Result<Self> {
        let determinant = matrix.determinant();
        if !determinant.is_finite() || determinant.abs() < 1e-15 {
            return Err(Error::SingularFrame { determinant });
        }
        Ok(Self {
            matrix,
            offset,
            inverse: matrix.inverse(),
        })
    }

    pub fn identity() -> Self {
        Self {
            matrix: DMat2::IDENTITY,
            offset: DVec2::ZERO,
            inverse: DMat2::IDENTITY,
        }
    }

    pub fn translation(offset: DVec2) -> Self {
        Self {
            offset,
            ..Self::identity()
        }
    }

    pub fn matrix(&self) -> DMat2 {
        self.matrix
    }

    pub fn offset(&self) -> DVec2 {
        self.offset
    }
}

impl PixelFrame for AffineFrame {
    #[inline]
    fn pixel_to_sky(&self, pixel: DVec2) -> DVec2 {
        self.matrix * pixel + self.offset
    }

    #[inline]
    fn sky_to_pixel(&self, sky: DVec2) -> DVec2 {
        self.inverse * (sky - self.offset)
    }
}

impl Footprint {
    /// Resample this footprint from the `source` frame into `target`,
    /// keeping only pixels inside `bbox`.
    ///
    /// A target pixel belongs to the result when its centre maps back onto a
    /// source pixel of the footprint. The result is normalized, its region is
    /// `bbox`, and peaks are mapped across; peaks that land outside the
    /// result are dropped.
    pub fn transform<S, T>(&self, source: &S, target: &T, bbox: Box2I) -> Footprint
    where
        S: PixelFrame + ?Sized,
        T: PixelFrame + ?Sized,
    {
        let mut source_spans = self.spans().to_vec();
        if !self.is_normalized() {
            normalize_spans(&mut source_spans);
        }

        let search = target_search_box(self.bbox(), source, target).intersection(&bbox);
        let mut spans = Vec::new();
        for y in search.y_min..=search.y_max {
            let mut run_start = None;
            for x in search.x_min..=search.x_max {
                let hit = pixel_of(map_point(target, source, pixel_center(x, y)))
                    .is_some_and(|p| sorted_contains(&source_spans, p.x, p.y));
                match (hit, run_start) {
                    (true, None) => run_start = Some(x),
                    (false, Some(x0)) => {
                        spans.push(Span::new(y, x0, x - 1));
                        run_start = None;
                    }
                    _ => {}
                }
            }
            if let Some(x0) = run_start {
                spans.push(Span::new(y, x0, search.x_max));
            }
        }

        let mut result = self.sibling(spans, true);
        result.set_region(Some(bbox));

        let mut dropped = 0usize;
        for peak in self.peaks() {
            let mapped = pixel_of(map_point(source, target, pixel_center(peak.x, peak.y)))
                .filter(|&p| result.contains(p));
            match mapped {
                Some(p) => {
                    result.add_peak(p.x, p.y, peak.value);
                }
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::warn!(
                source = %self.id(),
                dropped,
                "Peaks fell outside the transformed footprint"
            );
        }

        tracing::debug!(
            source = %self.id(),
            area_before = self.area(),
            area_after = result.area(),
            %search,
            "Transformed footprint"
        );

        result
    }
}

#[inline]
fn pixel_center(x: i32, y: i32) -> DVec2 {
    DVec2::new(f64::from(x), f64::from(y))
}

/// Nearest integer pixel, or `None` for non-finite or unrepresentable points.
fn pixel_of(point: DVec2) -> Option<Point2I> {
    let rounded = point.round();
    let range = f64::from(i32::MIN)..=f64::from(i32::MAX);
    (range.contains(&rounded.x) && range.contains(&rounded.y))
        .then(|| Point2I::new(rounded.x as i32, rounded.y as i32))
}

/// Target pixels that can possibly map back into `bbox`: the image of the
/// source box outline (along pixel edges), padded by one pixel.
fn target_search_box<S, T>(bbox: Box2I, source: &S, target: &T) -> Box2I
where
    S: PixelFrame + ?Sized,
    T: PixelFrame + ?Sized,
{
    if bbox.is_empty() {
        return Box2I::empty();
    }

    let x_lo = f64::from(bbox.x_min) - 0.5;
    let x_hi = f64::from(bbox.x_max) + 0.5;
    let y_lo = f64::from(bbox.y_min) - 0.5;
    let y_hi = f64::from(bbox.y_max) + 0.5;

    let horizontal = (0..=bbox.width()).flat_map(|i| {
        let x = x_lo + i as f64;
        [DVec2::new(x, y_lo), DVec2::new(x, y_hi)]
    });
    let vertical = (0..=bbox.height()).flat_map(|i| {
        let y = y_lo + i as f64;
        [DVec2::new(x_lo, y), DVec2::new(x_hi, y)]
    });

    let mut min = DVec2::splat(f64::INFINITY);
    let mut max = DVec2::splat(f64::NEG_INFINITY);
    for corner in horizontal.chain(vertical) {
        let mapped = map_point(source, target, corner);
        if mapped.is_finite() {
            min = min.min(mapped);
            max = max.max(mapped);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return Box2I::empty();
    }

    let clamp = |v: f64| v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
    Box2I::new(
        clamp(min.x.floor()),
        clamp(max.x.ceil()),
        clamp(min.y.floor()),
        clamp(max.y.ceil()),
    )
    .grown(1)
}
