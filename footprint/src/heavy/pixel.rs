use num_traits::Zero;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Element type of a heavy footprint's image channel.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum PixelType {
    U16,
    I32,
    F32,
    F64,
}

/// Flat image-channel values of one supported element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PixelArray {
    U16(Vec<u16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl PixelArray {
    pub fn pixel_type(&self) -> PixelType {
        match self {
            PixelArray::U16(_) => PixelType::U16,
            PixelArray::I32(_) => PixelType::I32,
            PixelArray::F32(_) => PixelType::F32,
            PixelArray::F64(_) => PixelType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PixelArray::U16(v) => v.len(),
            PixelArray::I32(v) => v.len(),
            PixelArray::F32(v) => v.len(),
            PixelArray::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Image element types a [`HeavyFootprint`](super::HeavyFootprint) can carry.
pub trait HeavyPixel: sealed::Sealed + Copy + Zero + PartialEq + Send + Sync + 'static {
    const TYPE: PixelType;

    fn into_array(values: Vec<Self>) -> PixelArray;

    /// The values of `array` if it holds this element type.
    fn from_array(array: &PixelArray) -> Option<&[Self]>;
}

macro_rules! heavy_pixel {
    ($ty:ty, $variant:ident) => {
        impl sealed::Sealed for $ty {}

        impl HeavyPixel for $ty {
            const TYPE: PixelType = PixelType::$variant;

            fn into_array(values: Vec<Self>) -> PixelArray {
                PixelArray::$variant(values)
            }

            fn from_array(array: &PixelArray) -> Option<&[Self]> {
                match array {
                    PixelArray::$variant(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
}

heavy_pixel!(u16, U16);
heavy_pixel!(i32, I32);
heavy_pixel!(f32, F32);
heavy_pixel!(f64, F64);
