//! Morphological dilation of footprints.
//!
//! Growth works directly on spans: every input span contributes one widened
//! span to each row within `ngrow` of it, and the contributions are merged
//! with the same rule as [`Footprint::normalize`]. Cost is proportional to
//! `spans * (2 * ngrow + 1)`, independent of the raster size.


use std::sync::Arc;

use rayon::prelude::*;

use crate::config::StructuringElement;
use crate::footprint::Footprint;
use crate::span::{normalize_spans, Span};
use crate::FootprintList;

/// Dilate `footprint` by a disk or square of radius `ngrow`.
///
/// The result is normalized, carries the input's peaks and region, and is
/// clipped to that region when one is set. `ngrow <= 0` returns a normalized
/// copy of the input.
pub fn grow_footprint(footprint: &Footprint, ngrow: i32, element: StructuringElement) -> Footprint {
    let mut spans = footprint.spans().to_vec();
    if !footprint.is_normalized() {
        normalize_spans(&mut spans);
    }

    if ngrow > 0 {
        let half_widths = half_widths(ngrow, element);
        let mut grown = Vec::with_capacity(spans.len() * half_widths.len());
        for span in &spans {
            for (dy, &h) in (-ngrow..=ngrow).zip(half_widths.iter()) {
                grown.push(Span::new(span.y() + dy, span.x0() - h, span.x1() + h));
            }
        }
        normalize_spans(&mut grown);
        spans = grown;
    }

    let mut result = footprint.sibling(spans, true);
    result.peaks_mut().extend_from_slice(footprint.peaks());
    result.clip_to_region();

    tracing::debug!(
        source = %footprint.id(),
        ngrow,
        ?element,
        area_before = footprint.area(),
        area_after = result.area(),
        "Grew footprint"
    );

    result
}

/// [`grow_footprint`] over a list, in parallel. Output order matches input.
pub fn grow_footprints(
    footprints: &[Arc<Footprint>],
    ngrow: i32,
    element: StructuringElement,
) -> FootprintList {
    footprints
        .par_iter()
        .map(|footprint| Arc::new(grow_footprint(footprint, ngrow, element)))
        .collect()
}

/// Horizontal expansion for each row offset `-ngrow..=ngrow`.
fn half_widths(ngrow: i32, element: StructuringElement) -> Vec<i32> {
    match element {
        StructuringElement::Disk => {
            let r2 = i64::from(ngrow) * i64::from(ngrow);
            (-ngrow..=ngrow)
                .map(|dy| isqrt(r2 - i64::from(dy) * i64::from(dy)) as i32)
                .collect()
        }
        StructuringElement::Square => vec![ngrow; (2 * ngrow + 1) as usize],
    }
}

/// Largest `h` with `h * h <= n`.
fn isqrt(n: i64) -> i64 {
    let mut h = (n as f64).sqrt() as i64;
    while h * h > n {
        h -= 1;
    }
    while (h + 1) * (h + 1) <= n {
        h += 1;
    }
    h
}
