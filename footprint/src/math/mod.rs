//! Integer geometry primitives.

mod bbox;
mod ellipse;

pub use bbox::Box2I;
pub use ellipse::Ellipse;

/// Integer pixel position.
pub type Point2I = glam::IVec2;
