//! Configuration types for growth and pixel payloads.

/// Structuring element used by [`grow_footprint`](crate::grow_footprint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructuringElement {
    /// Disk of radius `ngrow` (isotropic growth). Row `dy` away from a pixel
    /// gains `floor(sqrt(ngrow^2 - dy^2))` columns on each side.
    #[default]
    Disk,
    /// Square of half-size `ngrow`: every row within `ngrow` gains `ngrow`
    /// columns on each side.
    Square,
}

impl StructuringElement {
    /// `true` selects [`Disk`](Self::Disk), `false` selects [`Square`](Self::Square).
    pub fn from_isotropic(isotropic: bool) -> Self {
        if isotropic {
            Self::Disk
        } else {
            Self::Square
        }
    }

    pub fn is_isotropic(self) -> bool {
        matches!(self, Self::Disk)
    }
}

/// Controls what a [`HeavyFootprint`](crate::HeavyFootprint) stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeavyFootprintCtrl {
    /// Keep pixels whose image value is zero. When `false` they are omitted
    /// from the payload and written back as zero on insert.
    pub store_zero_values: bool,
}

impl Default for HeavyFootprintCtrl {
    fn default() -> Self {
        Self {
            store_zero_values: true,
        }
    }
}

impl HeavyFootprintCtrl {
    pub fn sparse() -> Self {
        Self {
            store_zero_values: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(StructuringElement::default(), StructuringElement::Disk);
        assert!(HeavyFootprintCtrl::default().store_zero_values);
        assert!(!HeavyFootprintCtrl::sparse().store_zero_values);
    }

    #[test]
    fn test_from_isotropic() {
        assert!(StructuringElement::from_isotropic(true).is_isotropic());
        assert_eq!(
            StructuringElement::from_isotropic(false),
            StructuringElement::Square
        );
    }
}
