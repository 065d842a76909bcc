use glam::DVec2;

use crate::error::{Error, Result};

/// Ellipse in pixel coordinates.
///
/// `a` and `b` are the semi-major and semi-minor axes, `theta` is the
/// position angle of the `a` axis, in radians, counter-clockwise from +x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: DVec2,
    pub a: f64,
    pub b: f64,
    pub theta: f64,
}

impl Ellipse {
    pub fn new(center: DVec2, a: f64, b: f64, theta: f64) -> Self {
        Self { center, a, b, theta }
    }

    pub fn validate(&self) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.a) || !valid(self.b) {
            return Err(Error::NonPositiveAxes {
                a: self.a,
                b: self.b,
            });
        }
        Ok(())
    }

    /// Half of the vertical extent of the ellipse.
    pub fn half_height(&self) -> f64 {
        let (sin, cos) = self.theta.sin_cos();
        (self.a * self.a * sin * sin + self.b * self.b * cos * cos).sqrt()
    }

    /// Horizontal interval `[x_lo, x_hi]` covered by the ellipse on row `y`,
    /// or `None` when the row misses it.
    pub fn row_extent(&self, y: f64) -> Option<(f64, f64)> {
        let (sin, cos) = self.theta.sin_cos();
        let inv_a2 = 1.0 / (self.a * self.a);
        let inv_b2 = 1.0 / (self.b * self.b);
        let dy = y - self.center.y;

        // (dx, dy) is inside when A*dx^2 + B*dx + C <= 0.
        let qa = cos * cos * inv_a2 + sin * sin * inv_b2;
        let qb = 2.0 * dy * sin * cos * (inv_a2 - inv_b2);
        let qc = dy * dy * (sin * sin * inv_a2 + cos * cos * inv_b2) - 1.0;

        let discriminant = qb * qb - 4.0 * qa * qc;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        Some((
            self.center.x + (-qb - root) / (2.0 * qa),
            self.center.x + (-qb + root) / (2.0 * qa),
        ))
    }
}
