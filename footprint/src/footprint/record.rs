use serde::{Deserialize, Serialize};

use crate::math::Box2I;
use crate::peak::Peak;
use crate::span::Span;

/// Serializable geometry of a footprint.
///
/// Span and peak order are preserved exactly. The id is not stored; a
/// restored footprint gets a fresh one from its factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintRecord {
    pub spans: Vec<Span>,
    pub peaks: Vec<Peak>,
    pub region: Option<Box2I>,
    pub normalized: bool,
}
