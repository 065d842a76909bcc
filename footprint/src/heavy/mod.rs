//! Footprints that carry the pixel values they cover.
//!
//! A [`HeavyFootprint`] snapshots the image, mask and variance values under a
//! footprint into three flat arrays, ordered span by span and left to right
//! within each span. The geometry is frozen at construction: the heavy
//! footprint owns its own copy and only hands out shared references, so the
//! arrays can never fall out of step with the spans they describe.

mod pixel;

use std::borrow::Borrow;
use std::ops::Deref;

use common::SerdeFormat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::HeavyFootprintCtrl;
use crate::error::{Error, Result};
use crate::footprint::{Footprint, FootprintFactory, FootprintRecord};
use crate::image::{Image, MaskPixel, MaskedImage, VariancePixel};
use crate::math::Point2I;
use crate::span::{spans_area, Span};

pub use pixel::{HeavyPixel, PixelArray, PixelType};

#[derive(Debug, Clone)]
pub struct HeavyFootprint {
    footprint: Footprint,
    /// Runs whose values are stored. Equal to the footprint's spans unless
    /// zero-valued pixels were skipped.
    packed: Vec<Span>,
    image: PixelArray,
    mask: Vec<MaskPixel>,
    variance: Vec<VariancePixel>,
    store_zero_values: bool,
}

impl HeavyFootprint {
    /// Copy the pixels under `footprint` out of `source`.
    ///
    /// Every pixel must lie inside `source`; nothing is read otherwise.
    pub fn new<T: HeavyPixel>(
        footprint: &Footprint,
        source: &MaskedImage<T>,
        ctrl: &HeavyFootprintCtrl,
    ) -> Result<Self> {
        for span in footprint.spans() {
            source.image().check_run(span.y(), span.x0(), span.x1())?;
        }

        let capacity = footprint.area();
        let mut image = Vec::with_capacity(capacity);
        let mut mask = Vec::with_capacity(capacity);
        let mut variance = Vec::with_capacity(capacity);
        let mut packed = Vec::with_capacity(footprint.spans().len());

        for span in footprint.spans() {
            let (y, x0, x1) = (span.y(), span.x0(), span.x1());
            let image_row = source.image().row_run(y, x0, x1)?;
            let mask_row = source.mask().row_run(y, x0, x1)?;
            let variance_row = source.variance().row_run(y, x0, x1)?;

            if ctrl.store_zero_values {
                image.extend_from_slice(image_row);
                mask.extend_from_slice(mask_row);
                variance.extend_from_slice(variance_row);
                packed.push(*span);
                continue;
            }

            let mut start = None;
            for (i, value) in image_row.iter().enumerate() {
                let keep = !value.is_zero();
                if keep {
                    image.push(*value);
                    mask.push(mask_row[i]);
                    variance.push(variance_row[i]);
                }
                let x = x0 + i as i32;
                match (keep, start) {
                    (true, None) => start = Some(x),
                    (false, Some(s)) => {
                        packed.push(Span::new(y, s, x - 1));
                        start = None;
                    }
                    _ => {}
                }
            }
            if let Some(s) = start {
                packed.push(Span::new(y, s, x1));
            }
        }

        tracing::debug!(
            source = %footprint.id(),
            pixel_type = %T::TYPE,
            area = footprint.area(),
            stored = image.len(),
            "Built heavy footprint"
        );

        Ok(Self {
            footprint: footprint.clone(),
            packed,
            image: T::into_array(image),
            mask,
            variance,
            store_zero_values: ctrl.store_zero_values,
        })
    }

    #[inline]
    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    #[inline]
    pub fn packed_spans(&self) -> &[Span] {
        &self.packed
    }

    #[inline]
    pub fn pixel_type(&self) -> PixelType {
        self.image.pixel_type()
    }

    #[inline]
    pub fn image_array(&self) -> &PixelArray {
        &self.image
    }

    /// Image values as `T`, or `None` if the payload holds another type.
    pub fn image_values<T: HeavyPixel>(&self) -> Option<&[T]> {
        T::from_array(&self.image)
    }

    #[inline]
    pub fn mask_values(&self) -> &[MaskPixel] {
        &self.mask
    }

    #[inline]
    pub fn variance_values(&self) -> &[VariancePixel] {
        &self.variance
    }

    #[inline]
    pub fn stores_zero_values(&self) -> bool {
        self.store_zero_values
    }

    /// Number of pixels held in each channel array.
    #[inline]
    pub fn stored_pixels(&self) -> usize {
        self.mask.len()
    }

    /// Write image, mask and variance values back into `target`.
    ///
    /// Pixels omitted from a sparse payload are written as zero in all three
    /// planes. Bounds and pixel type are checked before anything is written.
    pub fn insert<T: HeavyPixel>(&self, target: &mut MaskedImage<T>) -> Result<()> {
        let values = self.typed_values::<T>()?;
        self.check_bounds(target.image())?;

        if !self.store_zero_values {
            for span in self.footprint.spans() {
                let (y, x0, x1) = (span.y(), span.x0(), span.x1());
                target.image_mut().row_run_mut(y, x0, x1)?.fill(T::zero());
                target.mask_mut().row_run_mut(y, x0, x1)?.fill(0);
                target.variance_mut().row_run_mut(y, x0, x1)?.fill(0.0);
            }
        }

        let mut offset = 0;
        for span in &self.packed {
            let (y, x0, x1) = (span.y(), span.x0(), span.x1());
            let range = offset..offset + span.width() as usize;
            target
                .image_mut()
                .row_run_mut(y, x0, x1)?
                .copy_from_slice(&values[range.clone()]);
            target
                .mask_mut()
                .row_run_mut(y, x0, x1)?
                .copy_from_slice(&self.mask[range.clone()]);
            target
                .variance_mut()
                .row_run_mut(y, x0, x1)?
                .copy_from_slice(&self.variance[range.clone()]);
            offset = range.end;
        }
        Ok(())
    }

    /// Write only the image values back into `target`.
    pub fn insert_image<T: HeavyPixel>(&self, target: &mut Image<T>) -> Result<()> {
        let values = self.typed_values::<T>()?;
        self.check_bounds(target)?;

        if !self.store_zero_values {
            for span in self.footprint.spans() {
                target
                    .row_run_mut(span.y(), span.x0(), span.x1())?
                    .fill(T::zero());
            }
        }

        let mut offset = 0;
        for span in &self.packed {
            let width = span.width() as usize;
            target
                .row_run_mut(span.y(), span.x0(), span.x1())?
                .copy_from_slice(&values[offset..offset + width]);
            offset += width;
        }
        Ok(())
    }

    fn typed_values<T: HeavyPixel>(&self) -> Result<&[T]> {
        T::from_array(&self.image).ok_or(Error::PixelTypeMismatch {
            expected: self.image.pixel_type(),
            actual: T::TYPE,
        })
    }

    fn check_bounds<T>(&self, target: &Image<T>) -> Result<()> {
        for span in self.footprint.spans() {
            target.check_run(span.y(), span.x0(), span.x1())?;
        }
        Ok(())
    }

    pub fn to_record(&self) -> HeavyFootprintRecord {
        HeavyFootprintRecord {
            footprint: self.footprint.to_record(),
            packed: self.packed.clone(),
            image: self.image.clone(),
            mask: self.mask.clone(),
            variance: self.variance.clone(),
            store_zero_values: self.store_zero_values,
        }
    }

    pub fn to_bytes(&self, format: SerdeFormat) -> Result<Vec<u8>> {
        Ok(common::serialize(&self.to_record(), format)?)
    }

    /// Rebuild a heavy footprint, checking that the payload lines up with
    /// its geometry.
    pub fn from_record(factory: &FootprintFactory, record: HeavyFootprintRecord) -> Result<Self> {
        let HeavyFootprintRecord {
            footprint,
            packed,
            image,
            mask,
            variance,
            store_zero_values,
        } = record;
        let footprint = factory.from_record(footprint)?;

        if let Some(span) = packed.iter().find(|s| s.is_inverted()) {
            return Err(Error::InvertedSpan {
                y: span.y(),
                x0: span.x0(),
                x1: span.x1(),
            });
        }
        let stored = spans_area(&packed);
        if image.len() != stored || mask.len() != stored || variance.len() != stored {
            return Err(Error::inconsistent(format!(
                "payload lengths (image {}, mask {}, variance {}) do not match {stored} packed pixels",
                image.len(),
                mask.len(),
                variance.len(),
            )));
        }
        if store_zero_values && packed.as_slice() != footprint.spans() {
            return Err(Error::inconsistent(
                "dense payload spans differ from footprint spans",
            ));
        }
        if !store_zero_values {
            let outside = packed
                .iter()
                .flat_map(|s| s.xs().map(move |x| (x, s.y())))
                .any(|(x, y)| !footprint.contains(Point2I::new(x, y)));
            if outside {
                return Err(Error::inconsistent(
                    "sparse payload covers pixels outside the footprint",
                ));
            }
        }

        Ok(Self {
            footprint,
            packed,
            image,
            mask,
            variance,
            store_zero_values,
        })
    }

    pub fn from_bytes(
        factory: &FootprintFactory,
        bytes: &[u8],
        format: SerdeFormat,
    ) -> Result<Self> {
        let record: HeavyFootprintRecord = common::deserialize(bytes, format)?;
        Self::from_record(factory, record)
    }
}

/// Read-only access to the frozen geometry.
impl Deref for HeavyFootprint {
    type Target = Footprint;

    fn deref(&self) -> &Footprint {
        &self.footprint
    }
}

/// Serializable form of a [`HeavyFootprint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeavyFootprintRecord {
    pub footprint: FootprintRecord,
    pub packed: Vec<Span>,
    pub image: PixelArray,
    pub mask: Vec<MaskPixel>,
    pub variance: Vec<VariancePixel>,
    pub store_zero_values: bool,
}

/// Build one heavy footprint per input footprint, in parallel.
///
/// Fails with the first error encountered; output order matches input.
pub fn heavy_footprints<T, F>(
    footprints: &[F],
    source: &MaskedImage<T>,
    ctrl: &HeavyFootprintCtrl,
) -> Result<Vec<HeavyFootprint>>
where
    T: HeavyPixel,
    F: Borrow<Footprint> + Sync,
{
    footprints
        .par_iter()
        .map(|footprint| HeavyFootprint::new(footprint.borrow(), source, ctrl))
        .collect()
}
