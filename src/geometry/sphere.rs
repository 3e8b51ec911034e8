//! Sphere shape; doubles as the particle body.

use std::fmt;

use glam::DVec3;
use rand::rngs::StdRng;

/// A sphere given by center and radius.
///
/// Equality is exact, with no tolerance: particles compare equal only when
/// their shapes are bit-identical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub position: DVec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(position: DVec3, radius: f64) -> Self {
        Self { position, radius }
    }

    /// Signed distance from `pos` to the spherical surface; negative inside.
    pub fn distance(&self, pos: DVec3) -> f64 {
        (pos - self.position).length() - self.radius
    }

    /// Projection of `pos` onto the sphere's center together with the radial
    /// coordinate of `pos`.
    pub fn projected_point(&self, pos: DVec3) -> (DVec3, f64) {
        (self.position, (pos - self.position).length())
    }

    /// Closest point on the spherical surface and the signed separation
    /// from it.
    pub fn projected_point_on_surface(&self, pos: DVec3) -> (DVec3, f64) {
        let offset = pos - self.position;
        let r = offset.length();
        // Degenerate at the exact center; any direction is closest.
        let dir = if r > 0.0 { offset / r } else { DVec3::Z };
        (self.position + dir * self.radius, r - self.radius)
    }

    /// The sphere's proper random position is its center: particles bound
    /// to a sphere-shaped domain are tracked by the domain origin.
    pub fn random_position(&self, _rng: &mut StdRng) -> DVec3 {
        self.position
    }

    pub fn show(&self, precision: usize) -> String {
        format!("{self:.precision$}")
    }
}

impl fmt::Display for Sphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = f.precision().unwrap_or(6);
        write!(
            f,
            "{{({:.p$}, {:.p$}, {:.p$}), {:.p$}}}",
            self.position.x, self.position.y, self.position.z, self.radius,
            p = p
        )
    }
}
