//! Commonly used types and functions.
//!
//! ```rust,ignore
//! use footprint::prelude::*;
//! ```

// Geometry
pub use crate::{Box2I, Peak, Point2I, Span};

// Footprints
pub use crate::{Footprint, FootprintFactory, FootprintList};

// Operations
pub use crate::{
    clear_mask_from_footprint, footprint_and_mask, grow_footprint, grow_footprints,
    set_image_from_footprint, set_mask_from_footprint,
};

// Payloads and rasters
pub use crate::{HeavyFootprint, HeavyFootprintCtrl, Image, Mask, MaskedImage};

// Frames
pub use crate::{AffineFrame, PixelFrame};

pub use crate::{Error, Result, StructuringElement};
