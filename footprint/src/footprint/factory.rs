use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use common::SerdeFormat;

use crate::error::{Error, Result};
use crate::footprint::record::FootprintRecord;
use crate::footprint::{Footprint, FootprintId};
use crate::math::{Box2I, Ellipse, Point2I};
use crate::span::Span;

/// Mints [`Footprint`]s and owns the counter their ids come from.
///
/// Clones share one counter, so ids stay unique across every footprint
/// minted through any clone, on any thread. Footprints remember the factory
/// that made them so that copies and derived footprints draw from it too.
#[derive(Debug, Clone, Default)]
pub struct FootprintFactory {
    next: Arc<AtomicU64>,
}

impl FootprintFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_id(&self) -> FootprintId {
        FootprintId(self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Number of ids handed out so far.
    pub fn minted(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }

    pub fn empty(&self) -> Footprint {
        Footprint::from_parts(self.clone(), Vec::new(), Vec::new(), None, true)
    }

    /// Footprint covering every pixel of `bbox`.
    pub fn from_box(&self, bbox: Box2I) -> Result<Footprint> {
        if bbox.is_empty() {
            return Err(Error::EmptyBox);
        }
        let spans = (bbox.y_min..=bbox.y_max)
            .map(|y| Span::new(y, bbox.x_min, bbox.x_max))
            .collect();
        Ok(Footprint::from_parts(self.clone(), spans, Vec::new(), None, true))
    }

    /// Digitized disk of `radius` pixels around `center`.
    pub fn circle(&self, center: Point2I, radius: f64) -> Result<Footprint> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::NonPositiveRadius { radius });
        }
        let r = radius.floor() as i32;
        let r2 = radius * radius;
        let spans = (-r..=r)
            .map(|dy| {
                let half = (r2 - f64::from(dy * dy)).sqrt().floor() as i32;
                Span::new(center.y + dy, center.x - half, center.x + half)
            })
            .collect();
        Ok(Footprint::from_parts(self.clone(), spans, Vec::new(), None, true))
    }

    /// Every pixel whose centre lies inside `ellipse`.
    ///
    /// A thin ellipse that misses every pixel centre yields an empty
    /// footprint.
    pub fn ellipse(&self, ellipse: &Ellipse) -> Result<Footprint> {
        ellipse.validate()?;
        let half_height = ellipse.half_height();
        let y_lo = (ellipse.center.y - half_height).ceil() as i32;
        let y_hi = (ellipse.center.y + half_height).floor() as i32;

        let spans = (y_lo..=y_hi)
            .filter_map(|y| {
                let (lo, hi) = ellipse.row_extent(f64::from(y))?;
                let x0 = lo.ceil() as i32;
                let x1 = hi.floor() as i32;
                (x0 <= x1).then_some(Span::new(y, x0, x1))
            })
            .collect();
        Ok(Footprint::from_parts(self.clone(), spans, Vec::new(), None, true))
    }

    /// Footprint holding `spans` in the given order.
    ///
    /// Fails on the first inverted span; the spans are not merged or sorted.
    pub fn from_spans(&self, spans: impl IntoIterator<Item = Span>) -> Result<Footprint> {
        let mut footprint = self.empty();
        for span in spans {
            footprint.push_span(span)?;
        }
        Ok(footprint)
    }

    /// Rebuild a footprint from its structured record.
    pub fn from_record(&self, record: FootprintRecord) -> Result<Footprint> {
        let FootprintRecord {
            spans,
            peaks,
            region,
            normalized,
        } = record;

        let mut footprint = self.from_spans(spans)?;
        if normalized && !footprint.is_normalized() {
            return Err(Error::inconsistent(
                "record claims normalized spans but they are unsorted or touching",
            ));
        }
        footprint.normalized = normalized;
        footprint.peaks = peaks;
        footprint.region = region;
        Ok(footprint)
    }

    pub fn footprint_from_bytes(&self, bytes: &[u8], format: SerdeFormat) -> Result<Footprint> {
        let record: FootprintRecord = common::deserialize(bytes, format)?;
        self.from_record(record)
    }
}
