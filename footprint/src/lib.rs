//! Footprints: sparse, arbitrarily shaped pixel regions over 2-D rasters.
//!
//! A [`Footprint`] stores a pixel set as horizontal [`Span`]s plus a list of
//! [`Peak`]s. On top of it the crate provides:
//! - Shape construction (boxes, circles, ellipses, span lists) through a
//!   [`FootprintFactory`] that owns the id counter
//! - Morphological growth with a disk or square structuring element
//! - Rasterization onto mask and image planes
//! - [`HeavyFootprint`]s that carry the pixel values they cover
//! - Resampling between [`PixelFrame`]s
//! - Round-tripping through YAML, JSON or compressed binary records
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use footprint::prelude::*;
//!
//! let factory = FootprintFactory::new();
//! let mut footprint = factory.from_spans([Span::new(0, 2, 5), Span::new(1, 2, 5)])?;
//! footprint.normalize();
//!
//! let grown = grow_footprint(&footprint, 2, StructuringElement::Disk);
//! let mut mask = Mask::new_default(Box2I::new(0, 15, 0, 15));
//! set_mask_from_footprint(&mut mask, &grown, 0x1);
//! ```

mod bbox_list;
pub mod config;
mod error;
mod footprint;
mod grow;
mod heavy;
pub mod image;
mod mask_ops;
pub mod math;
mod peak;
mod span;
mod transform;

pub mod prelude;

use std::sync::Arc;

// ============================================================================
// Geometry
// ============================================================================

pub use math::{Box2I, Ellipse, Point2I};
pub use peak::Peak;
pub use span::Span;

// ============================================================================
// Footprints
// ============================================================================

pub use footprint::{Footprint, FootprintFactory, FootprintId, FootprintRecord, IdOverwrite};

/// Footprints shared at list level. Spans are never shared individually.
pub type FootprintList = Vec<Arc<Footprint>>;

pub use bbox_list::{footprint_to_bbox_list, write_footprint_as_defects};
pub use grow::{grow_footprint, grow_footprints};
pub use mask_ops::{
    clear_mask_from_footprint, clear_mask_from_footprint_list, footprint_and_mask,
    set_image_from_footprint, set_image_from_footprint_list, set_mask_from_footprint,
    set_mask_from_footprint_list,
};
pub use transform::{map_point, AffineFrame, PixelFrame};

// ============================================================================
// Pixel payloads
// ============================================================================

pub use heavy::{
    heavy_footprints, HeavyFootprint, HeavyFootprintRecord, HeavyPixel, PixelArray, PixelType,
};
pub use image::{Image, Mask, MaskPixel, MaskedImage, VariancePixel};

// ============================================================================
// Configuration and errors
// ============================================================================

pub use config::{HeavyFootprintCtrl, StructuringElement};
pub use error::{Error, ErrorKind, Result};
