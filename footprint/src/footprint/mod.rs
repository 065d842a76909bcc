//! The [`Footprint`] type: a sparse pixel set stored as horizontal spans.

mod factory;
mod record;
#[cfg(test)]
mod tests;

use std::collections::BTreeSet;
use std::fmt;

use common::SerdeFormat;
use num_traits::{NumCast, PrimInt};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::Image;
use crate::math::{Box2I, Point2I};
use crate::peak::Peak;
use crate::span::{normalize_spans, sorted_contains, spans_area, Span};

pub use factory::FootprintFactory;
pub use record::FootprintRecord;

/// Identifier stamped on a footprint when it is minted. Unique among the
/// footprints of one [`FootprintFactory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FootprintId(pub(crate) u64);

impl FootprintId {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FootprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Policy for [`Footprint::insert_ids_into_image`].
#[derive(Debug, Default)]
pub struct IdOverwrite<'a> {
    /// Replace only the bits selected by `id_mask`. When false, the id is
    /// OR-ed into whatever the pixel already holds.
    pub overwrite_id: bool,
    pub id_mask: u64,
    /// Receives every non-zero value found under the footprint before it is
    /// overwritten.
    pub old_ids: Option<&'a mut BTreeSet<u64>>,
}

/// An arbitrary, possibly disconnected, set of pixels.
///
/// Spans are kept in insertion order until [`normalize`](Self::normalize)
/// sorts and merges them. `bbox` and `area` are maintained by every mutator.
/// Cloning copies spans and peaks but stamps the copy with a new id.
#[derive(Debug)]
pub struct Footprint {
    id: FootprintId,
    factory: FootprintFactory,
    spans: Vec<Span>,
    peaks: Vec<Peak>,
    bbox: Box2I,
    region: Option<Box2I>,
    area: usize,
    normalized: bool,
}

impl Clone for Footprint {
    fn clone(&self) -> Self {
        Self {
            id: self.factory.next_id(),
            factory: self.factory.clone(),
            spans: self.spans.clone(),
            peaks: self.peaks.clone(),
            bbox: self.bbox,
            region: self.region,
            area: self.area,
            normalized: self.normalized,
        }
    }
}

impl Footprint {
    /// Assemble a footprint from spans already known to be valid.
    /// `normalized` must only be true when `spans` are in canonical order.
    pub(crate) fn from_parts(
        factory: FootprintFactory,
        spans: Vec<Span>,
        peaks: Vec<Peak>,
        region: Option<Box2I>,
        normalized: bool,
    ) -> Self {
        debug_assert!(spans.iter().all(|s| !s.is_inverted()));
        let mut footprint = Self {
            id: factory.next_id(),
            factory,
            spans,
            peaks,
            bbox: Box2I::empty(),
            region,
            area: 0,
            normalized,
        };
        footprint.refresh();
        footprint
    }

    /// Empty footprint stamped from the same factory as `self`.
    pub(crate) fn sibling(&self, spans: Vec<Span>, normalized: bool) -> Self {
        Self::from_parts(
            self.factory.clone(),
            spans,
            Vec::new(),
            self.region,
            normalized,
        )
    }

    pub fn with_region(mut self, region: Box2I) -> Self {
        self.region = Some(region);
        self
    }

    #[inline]
    pub fn id(&self) -> FootprintId {
        self.id
    }

    #[inline]
    pub fn factory(&self) -> &FootprintFactory {
        &self.factory
    }

    #[inline]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    #[inline]
    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    #[inline]
    pub fn peaks_mut(&mut self) -> &mut Vec<Peak> {
        &mut self.peaks
    }

    pub fn add_peak(&mut self, x: i32, y: i32, value: f32) -> &Peak {
        self.peaks.push(Peak::new(x, y, value));
        &self.peaks[self.peaks.len() - 1]
    }

    /// Translate every peak. [`shift`](Self::shift) leaves peaks alone.
    pub fn shift_peaks(&mut self, dx: i32, dy: i32) {
        self.peaks.iter_mut().for_each(|p| p.shift(dx, dy));
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.area
    }

    #[inline]
    pub fn npix(&self) -> usize {
        self.area
    }

    #[inline]
    pub fn bbox(&self) -> Box2I {
        self.bbox
    }

    /// Extent of the raster this footprint lives in; `None` is unbounded.
    #[inline]
    pub fn region(&self) -> Option<Box2I> {
        self.region
    }

    pub fn set_region(&mut self, region: Option<Box2I>) {
        self.region = region;
    }

    #[inline]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Every pixel, span by span, left to right.
    pub fn pixels(&self) -> impl Iterator<Item = Point2I> + '_ {
        self.spans
            .iter()
            .flat_map(|s| s.xs().map(move |x| Point2I::new(x, s.y())))
    }

    pub fn add_span(&mut self, y: i32, x0: i32, x1: i32) -> Result<&Span> {
        self.push_span(Span::new(y, x0, x1))
    }

    pub fn push_span_shifted(&mut self, mut span: Span, dx: i32, dy: i32) -> Result<&Span> {
        span.shift(dx, dy);
        self.push_span(span)
    }

    /// Append `span` without sorting or merging.
    ///
    /// The footprint stays normalized only if it was and `span` falls after
    /// the last span in canonical order. This is looser than clearing the
    /// flag on every append past the first: spans pushed in canonical order
    /// leave it set.
    pub fn push_span(&mut self, span: Span) -> Result<&Span> {
        if span.is_inverted() {
            return Err(Error::InvertedSpan {
                y: span.y(),
                x0: span.x0(),
                x1: span.x1(),
            });
        }

        self.normalized =
            self.normalized && self.spans.last().is_none_or(|last| span.follows(last));
        self.area += span.width() as usize;
        self.bbox.include(span.x0(), span.y());
        self.bbox.include(span.x1(), span.y());
        self.spans.push(span);

        Ok(&self.spans[self.spans.len() - 1])
    }

    /// Translate every span and the bounding box. Peaks stay where they are;
    /// use [`shift_peaks`](Self::shift_peaks) to move them as well.
    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.spans.iter_mut().for_each(|s| s.shift(dx, dy));
        self.bbox.shift(dx, dy);
    }

    /// Sort spans and merge overlapping or touching runs. Idempotent.
    pub fn normalize(&mut self) {
        if self.normalized {
            return;
        }
        normalize_spans(&mut self.spans);
        self.area = spans_area(&self.spans);
        self.normalized = true;
    }

    /// Drop everything outside `bbox`, truncating spans that straddle it.
    /// Peaks are untouched.
    pub fn clip_to(&mut self, bbox: Box2I) {
        if bbox.contains_box(&self.bbox) {
            return;
        }
        self.spans = self.clipped_spans(bbox).collect();
        self.refresh();
    }

    /// [`clip_to`](Self::clip_to) the footprint's own region, if bounded.
    pub fn clip_to_region(&mut self) {
        if let Some(region) = self.region {
            self.clip_to(region);
        }
    }

    /// Spans restricted to `bbox`, in footprint order.
    pub(crate) fn clipped_spans(&self, bbox: Box2I) -> impl Iterator<Item = Span> + '_ {
        self.spans
            .iter()
            .filter(move |s| s.y() >= bbox.y_min && s.y() <= bbox.y_max)
            .filter_map(move |s| s.clipped(bbox.x_min, bbox.x_max))
    }

    pub fn contains(&self, point: Point2I) -> bool {
        if !self.bbox.contains(point.x, point.y) {
            return false;
        }
        if self.normalized {
            sorted_contains(&self.spans, point.x, point.y)
        } else {
            self.spans.iter().any(|s| s.contains_point(point.x, point.y))
        }
    }

    /// Keep only pixels where `mask & bitmask` is non-zero. Pixels outside
    /// the mask are dropped. Spans may split into several runs.
    pub fn intersect_mask<M: PrimInt>(&mut self, mask: &Image<M>, bitmask: M) {
        let extent = mask.bbox();
        let mut kept = Vec::with_capacity(self.spans.len());

        for span in self.clipped_spans(extent) {
            let y = span.y();
            let mut run_start = None;
            for x in span.xs() {
                let hit = mask.get(x, y).is_some_and(|&m| m & bitmask != M::zero());
                match (hit, run_start) {
                    (true, None) => run_start = Some(x),
                    (false, Some(x0)) => {
                        kept.push(Span::new(y, x0, x - 1));
                        run_start = None;
                    }
                    _ => {}
                }
            }
            if let Some(x0) = run_start {
                kept.push(Span::new(y, x0, span.x1()));
            }
        }

        self.spans = kept;
        self.refresh();
    }

    /// Write `id` into every pixel of the footprint.
    ///
    /// Without a `region` every pixel must lie inside `image`; the first
    /// offending pixel is reported and nothing is written. With a `region`
    /// the write is clipped to `region` and the image extent.
    pub fn insert_into_image<T: Copy + NumCast>(
        &self,
        image: &mut Image<T>,
        id: u64,
        region: Option<Box2I>,
    ) -> Result<()> {
        let value = T::from(id).ok_or(Error::IdOutOfRange { id })?;
        for span in self.write_runs(image, region)? {
            image
                .row_run_mut(span.y(), span.x0(), span.x1())?
                .fill(value);
        }
        Ok(())
    }

    /// Write `id` into every pixel of the footprint, combining it with what
    /// the pixel already holds according to `policy`.
    ///
    /// With `overwrite_id`, `id` must lie within `id_mask`; bits outside the
    /// mask are never changed. Bounds are handled as in
    /// [`insert_into_image`](Self::insert_into_image).
    pub fn insert_ids_into_image<T: PrimInt>(
        &self,
        image: &mut Image<T>,
        id: u64,
        mut policy: IdOverwrite<'_>,
        region: Option<Box2I>,
    ) -> Result<()> {
        if policy.overwrite_id && id & !policy.id_mask != 0 {
            return Err(Error::IdOutsideMask {
                id,
                id_mask: policy.id_mask,
            });
        }
        let value = T::from(id).ok_or(Error::IdOutOfRange { id })?;
        let full = T::max_value().to_u64().unwrap_or(u64::MAX);
        let id_mask = T::from(policy.id_mask & full).unwrap_or_else(T::zero);

        for span in self.write_runs(image, region)? {
            for pixel in image.row_run_mut(span.y(), span.x0(), span.x1())? {
                let old = *pixel;
                if old != T::zero() {
                    if let (Some(ids), Some(old_id)) = (policy.old_ids.as_deref_mut(), old.to_u64())
                    {
                        ids.insert(old_id);
                    }
                }
                *pixel = if policy.overwrite_id {
                    (old & !id_mask) | value
                } else {
                    old | value
                };
            }
        }
        Ok(())
    }

    /// Runs to rasterize into `image`, validated or clipped.
    fn write_runs<T>(&self, image: &Image<T>, region: Option<Box2I>) -> Result<Vec<Span>> {
        match region {
            None => {
                for span in &self.spans {
                    image.check_run(span.y(), span.x0(), span.x1())?;
                }
                Ok(self.spans.clone())
            }
            Some(region) => Ok(self
                .clipped_spans(region.intersection(&image.bbox()))
                .collect()),
        }
    }

    pub fn to_record(&self) -> FootprintRecord {
        FootprintRecord {
            spans: self.spans.clone(),
            peaks: self.peaks.clone(),
            region: self.region,
            normalized: self.normalized,
        }
    }

    pub fn to_bytes(&self, format: SerdeFormat) -> Result<Vec<u8>> {
        Ok(common::serialize(&self.to_record(), format)?)
    }

    /// Recompute `bbox` and `area` from the spans.
    fn refresh(&mut self) {
        let mut bbox = Box2I::empty();
        for span in &self.spans {
            bbox.include(span.x0(), span.y());
            bbox.include(span.x1(), span.y());
        }
        self.bbox = bbox;
        self.area = spans_area(&self.spans);
    }
}
