//! Rasterizing footprints onto mask and image planes.
//!
//! All functions here clip to the destination extent: pixels of a footprint
//! that fall outside the buffer are silently skipped. List variants apply
//! footprints in order; since OR, AND-NOT and constant fill are idempotent
//! the final buffer does not depend on that order.


use std::borrow::Borrow;

use num_traits::PrimInt;

use crate::footprint::Footprint;
use crate::image::{Image, Mask};

/// OR `bitmask` into every mask pixel under `footprint`. Returns `bitmask`.
pub fn set_mask_from_footprint<M: PrimInt>(
    mask: &mut Mask<M>,
    footprint: &Footprint,
    bitmask: M,
) -> M {
    for_each_run(mask, footprint, |run| {
        run.iter_mut().for_each(|m| *m = *m | bitmask)
    });
    bitmask
}

/// Clear `bitmask` from every mask pixel under `footprint`. Returns `bitmask`.
pub fn clear_mask_from_footprint<M: PrimInt>(
    mask: &mut Mask<M>,
    footprint: &Footprint,
    bitmask: M,
) -> M {
    for_each_run(mask, footprint, |run| {
        run.iter_mut().for_each(|m| *m = *m & !bitmask)
    });
    bitmask
}

pub fn set_mask_from_footprint_list<M, F>(mask: &mut Mask<M>, footprints: &[F], bitmask: M) -> M
where
    M: PrimInt,
    F: Borrow<Footprint>,
{
    for footprint in footprints {
        set_mask_from_footprint(mask, footprint.borrow(), bitmask);
    }
    bitmask
}

pub fn clear_mask_from_footprint_list<M, F>(mask: &mut Mask<M>, footprints: &[F], bitmask: M) -> M
where
    M: PrimInt,
    F: Borrow<Footprint>,
{
    for footprint in footprints {
        clear_mask_from_footprint(mask, footprint.borrow(), bitmask);
    }
    bitmask
}

/// Write `value` into every image pixel under `footprint`. Returns `value`.
pub fn set_image_from_footprint<T: Copy>(
    image: &mut Image<T>,
    footprint: &Footprint,
    value: T,
) -> T {
    for_each_run(image, footprint, |run| run.fill(value));
    value
}

pub fn set_image_from_footprint_list<T, F>(image: &mut Image<T>, footprints: &[F], value: T) -> T
where
    T: Copy,
    F: Borrow<Footprint>,
{
    for footprint in footprints {
        set_image_from_footprint(image, footprint.borrow(), value);
    }
    value
}

/// New footprint holding the pixels of `footprint` whose mask value shares
/// a bit with `bitmask`. The input is left unchanged.
pub fn footprint_and_mask<M: PrimInt>(
    footprint: &Footprint,
    mask: &Mask<M>,
    bitmask: M,
) -> Footprint {
    let mut result = footprint.clone();
    result.intersect_mask(mask, bitmask);
    result
}

/// Call `apply` on each in-bounds run of `footprint` within `image`.
fn for_each_run<T>(
    image: &mut Image<T>,
    footprint: &Footprint,
    mut apply: impl FnMut(&mut [T]),
) {
    let extent = image.bbox();
    let mut touched = 0usize;
    for span in footprint.clipped_spans(extent) {
        // Clipped to the extent, so the run is always in bounds.
        if let Ok(run) = image.row_run_mut(span.y(), span.x0(), span.x1()) {
            touched += run.len();
            apply(run);
        }
    }
    tracing::trace!(id = %footprint.id(), touched, "Rasterized footprint");
}
