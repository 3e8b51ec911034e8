//! Finite rectangular plane shape.

use std::fmt;

use glam::DVec3;
use rand::rngs::StdRng;
use rand::Rng;

/// A finite rectangle given by center, an orthonormal frame
/// `(unit_x, unit_y, unit_z = unit_x × unit_y)`, and half extents along
/// `unit_x` and `unit_y`.
///
/// One-sided planes only admit particles on their `+unit_z` side; the flag
/// is consulted by dissociation sampling, not by the geometry itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub position: DVec3,
    pub unit_x: DVec3,
    pub unit_y: DVec3,
    pub unit_z: DVec3,
    pub half_extent: [f64; 2],
    pub one_sided: bool,
}

impl Plane {
    pub fn new(
        position: DVec3,
        unit_x: DVec3,
        unit_y: DVec3,
        half_lx: f64,
        half_ly: f64,
        one_sided: bool,
    ) -> Self {
        let unit_x = unit_x.normalize();
        let unit_y = unit_y.normalize();
        Self {
            position,
            unit_x,
            unit_y,
            unit_z: unit_x.cross(unit_y),
            half_extent: [half_lx, half_ly],
            one_sided,
        }
    }

    /// Full extents.
    pub fn lx(&self) -> f64 {
        2.0 * self.half_extent[0]
    }

    pub fn ly(&self) -> f64 {
        2.0 * self.half_extent[1]
    }

    /// Coefficients of `pos - center` in the plane's basis.
    pub fn to_internal(&self, pos: DVec3) -> (f64, f64, f64) {
        let offset = pos - self.position;
        (
            offset.dot(self.unit_x),
            offset.dot(self.unit_y),
            offset.dot(self.unit_z),
        )
    }

    /// Projection of `pos` onto the plane and the normal coefficient.
    pub fn projected_point(&self, pos: DVec3) -> (DVec3, f64) {
        let (x, y, z) = self.to_internal(pos);
        (self.position + self.unit_x * x + self.unit_y * y, z)
    }

    /// The projection already lies on the surface.
    pub fn projected_point_on_surface(&self, pos: DVec3) -> (DVec3, f64) {
        self.projected_point(pos)
    }

    /// Distance from `pos` to the finite plane, accounting for the edges.
    pub fn distance(&self, pos: DVec3) -> f64 {
        let (x, y, z) = self.to_internal(pos);
        let dx = x.abs() - self.half_extent[0];
        let dy = y.abs() - self.half_extent[1];

        if dx < 0.0 && dy < 0.0 {
            // Directly over the rectangle.
            return z.abs();
        }

        let dx = dx.max(0.0);
        let dy = dy.max(0.0);
        (dx * dx + dy * dy + z * z).sqrt()
    }

    /// Uniform random position over the rectangle interior.
    pub fn random_position(&self, rng: &mut StdRng) -> DVec3 {
        self.position
            + self.unit_x * (self.half_extent[0] * rng.gen_range(-1.0..1.0))
            + self.unit_y * (self.half_extent[1] * rng.gen_range(-1.0..1.0))
    }

    pub fn show(&self, precision: usize) -> String {
        format!("{self:.precision$}")
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = f.precision().unwrap_or(6);
        write!(
            f,
            "{{({:.p$}, {:.p$}, {:.p$}), ({:.p$}, {:.p$}, {:.p$}), ({:.p$}, {:.p$}, {:.p$}), {:.p$}, {:.p$}}}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.unit_x.x,
            self.unit_x.y,
            self.unit_x.z,
            self.unit_y.x,
            self.unit_y.y,
            self.unit_y.z,
            self.lx(),
            self.ly(),
            p = p
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy_plane() -> Plane {
        Plane::new(DVec3::ZERO, DVec3::X, DVec3::Y, 1.0, 2.0, false)
    }

    #[test]
    fn test_normal_is_cross_product() {
        let p = xy_plane();
        assert!((p.unit_z - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_distance_over_interior() {
        let p = xy_plane();
        assert!((p.distance(DVec3::new(0.5, -1.0, 3.0)) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_past_edge() {
        let p = xy_plane();
        // One unit past the x edge, four above: 1-4-z Pythagoras.
        let d = p.distance(DVec3::new(2.0, 0.0, 4.0));
        assert!((d - 17.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_projection_strips_normal_component() {
        let p = xy_plane();
        let (on_plane, z) = p.projected_point(DVec3::new(0.25, 0.5, -2.0));
        assert!((on_plane - DVec3::new(0.25, 0.5, 0.0)).length() < 1e-12);
        assert!((z + 2.0).abs() < 1e-12);
    }
}
