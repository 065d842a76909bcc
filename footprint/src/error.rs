//! Error types for footprint operations.

use thiserror::Error;

use crate::heavy::PixelType;
use crate::math::Box2I;

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed shape input (inverted interval, non-positive radius, ...).
    Geometry,
    /// A write or read outside the destination buffer or declared region.
    Bounds,
    /// Data that violates an invariant it claims to satisfy.
    InconsistentState,
    /// Pixel payload of one channel type used with another.
    Type,
    /// Encoding or decoding of a structured record failed.
    Serialization,
}

/// Errors that can occur when building, rasterizing or restoring footprints.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Inverted span on row {y}: x0={x0} > x1={x1}")]
    InvertedSpan { y: i32, x0: i32, x1: i32 },

    #[error("Empty bounding box cannot define a footprint")]
    EmptyBox,

    #[error("Radius must be positive and finite, got {radius}")]
    NonPositiveRadius { radius: f64 },

    #[error("Ellipse axes must be positive and finite, got a={a}, b={b}")]
    NonPositiveAxes { a: f64, b: f64 },

    #[error("Pixel frame matrix is singular (det = {determinant})")]
    SingularFrame { determinant: f64 },

    #[error("Pixel ({x}, {y}) lies outside {extent}")]
    OutOfBounds { x: i32, y: i32, extent: Box2I },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: Box2I, actual: Box2I },

    #[error("Pixel buffer holds {actual} values, extent {extent} needs {expected}")]
    PixelCountMismatch {
        extent: Box2I,
        expected: usize,
        actual: usize,
    },

    #[error("Id {id} does not fit in the destination pixel type")]
    IdOutOfRange { id: u64 },

    #[error("Id {id:#x} sets bits outside the overwrite mask {id_mask:#x}")]
    IdOutsideMask { id: u64, id_mask: u64 },

    #[error("Inconsistent footprint data: {reason}")]
    Inconsistent { reason: String },

    #[error("Pixel type mismatch: payload holds {expected}, destination is {actual}")]
    PixelTypeMismatch {
        expected: PixelType,
        actual: PixelType,
    },

    #[error("Footprint serialization failed: {0}")]
    Serde(#[from] common::SerdeError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvertedSpan { .. }
            | Error::EmptyBox
            | Error::NonPositiveRadius { .. }
            | Error::NonPositiveAxes { .. }
            | Error::SingularFrame { .. } => ErrorKind::Geometry,
            Error::OutOfBounds { .. }
            | Error::DimensionMismatch { .. }
            | Error::PixelCountMismatch { .. }
            | Error::IdOutOfRange { .. }
            | Error::IdOutsideMask { .. } => ErrorKind::Bounds,
            Error::Inconsistent { .. } => ErrorKind::InconsistentState,
            Error::PixelTypeMismatch { .. } => ErrorKind::Type,
            Error::Serde(_) => ErrorKind::Serialization,
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        Error::Inconsistent {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
