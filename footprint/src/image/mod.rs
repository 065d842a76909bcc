//! Dense 2-D pixel buffers with a signed origin.
//!
//! These are the raster collaborators footprints are rasterized onto and
//! read from. Storage is row-major; the only bulk access footprints need is
//! a contiguous horizontal run of one row, see [`Image::row_run_mut`].


use crate::error::{Error, Result};
use crate::math::Box2I;

pub type MaskPixel = u16;
pub type VariancePixel = f32;

/// A bit-plane mask.
pub type Mask<M = MaskPixel> = Image<M>;

/// Row-major 2-D buffer whose pixel `(x, y)` lives at
/// `(y - y0) * width + (x - x0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    pixels: Vec<T>,
    bbox: Box2I,
    width: usize,
}

impl<T> Image<T> {
    /// Wrap existing pixels covering `bbox`.
    pub fn from_vec(bbox: Box2I, pixels: Vec<T>) -> Result<Self> {
        if pixels.len() != bbox.area() {
            return Err(Error::PixelCountMismatch {
                extent: bbox,
                expected: bbox.area(),
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width: bbox.width(),
            bbox,
        })
    }

    #[inline]
    pub fn bbox(&self) -> Box2I {
        self.bbox
    }

    #[inline]
    pub fn x0(&self) -> i32 {
        self.bbox.x_min
    }

    #[inline]
    pub fn y0(&self) -> i32 {
        self.bbox.y_min
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.bbox.height()
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.pixels
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.bbox.contains(x, y));
        (y - self.bbox.y_min) as usize * self.width + (x - self.bbox.x_min) as usize
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        if self.bbox.contains(x, y) {
            Some(&self.pixels[self.offset(x, y)])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        if self.bbox.contains(x, y) {
            let offset = self.offset(x, y);
            Some(&mut self.pixels[offset])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: i32, y: i32, value: T) -> Result<()> {
        let extent = self.bbox;
        let pixel = self
            .get_mut(x, y)
            .ok_or(Error::OutOfBounds { x, y, extent })?;
        *pixel = value;
        Ok(())
    }

    /// Check that columns `x0..=x1` of row `y` are inside the buffer,
    /// reporting the first offending pixel otherwise.
    pub fn check_run(&self, y: i32, x0: i32, x1: i32) -> Result<()> {
        let extent = self.bbox;
        if y < extent.y_min || y > extent.y_max || x0 < extent.x_min {
            return Err(Error::OutOfBounds { x: x0, y, extent });
        }
        if x1 > extent.x_max {
            return Err(Error::OutOfBounds { x: x1, y, extent });
        }
        Ok(())
    }

    /// Pixels `x0..=x1` of row `y` as one contiguous slice.
    pub fn row_run(&self, y: i32, x0: i32, x1: i32) -> Result<&[T]> {
        self.check_run(y, x0, x1)?;
        if x1 < x0 {
            return Ok(&[]);
        }
        let start = self.offset(x0, y);
        Ok(&self.pixels[start..=start + (x1 - x0) as usize])
    }

    /// Mutable pixels `x0..=x1` of row `y` as one contiguous slice.
    pub fn row_run_mut(&mut self, y: i32, x0: i32, x1: i32) -> Result<&mut [T]> {
        self.check_run(y, x0, x1)?;
        if x1 < x0 {
            return Ok(&mut []);
        }
        let start = self.offset(x0, y);
        Ok(&mut self.pixels[start..=start + (x1 - x0) as usize])
    }
}

impl<T: Clone> Image<T> {
    pub fn new_filled(bbox: Box2I, value: T) -> Self {
        Self {
            pixels: vec![value; bbox.area()],
            width: bbox.width(),
            bbox,
        }
    }

    #[inline]
    pub fn fill(&mut self, value: T) {
        self.pixels.fill(value);
    }
}

impl<T: Default + Clone> Image<T> {
    pub fn new_default(bbox: Box2I) -> Self {
        Self::new_filled(bbox, T::default())
    }
}

/// Image, mask and variance planes over one shared extent.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedImage<T> {
    image: Image<T>,
    mask: Mask,
    variance: Image<VariancePixel>,
}

impl<T> MaskedImage<T> {
    pub fn new(image: Image<T>, mask: Mask, variance: Image<VariancePixel>) -> Result<Self> {
        for actual in [mask.bbox(), variance.bbox()] {
            if actual != image.bbox() {
                return Err(Error::DimensionMismatch {
                    expected: image.bbox(),
                    actual,
                });
            }
        }
        Ok(Self {
            image,
            mask,
            variance,
        })
    }

    #[inline]
    pub fn bbox(&self) -> Box2I {
        self.image.bbox()
    }

    #[inline]
    pub fn image(&self) -> &Image<T> {
        &self.image
    }

    #[inline]
    pub fn image_mut(&mut self) -> &mut Image<T> {
        &mut self.image
    }

    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    #[inline]
    pub fn mask_mut(&mut self) -> &mut Mask {
        &mut self.mask
    }

    #[inline]
    pub fn variance(&self) -> &Image<VariancePixel> {
        &self.variance
    }

    #[inline]
    pub fn variance_mut(&mut self) -> &mut Image<VariancePixel> {
        &mut self.variance
    }

    pub fn into_parts(self) -> (Image<T>, Mask, Image<VariancePixel>) {
        (self.image, self.mask, self.variance)
    }
}

impl<T: Default + Clone> MaskedImage<T> {
    pub fn new_default(bbox: Box2I) -> Self {
        Self {
            image: Image::new_default(bbox),
            mask: Image::new_default(bbox),
            variance: Image::new_default(bbox),
        }
    }
}
