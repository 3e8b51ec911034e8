//! Finite cylinder shape, the substrate of rod-like surfaces.

use std::fmt;

use glam::DVec3;
use rand::rngs::StdRng;
use rand::Rng;

/// A finite cylinder given by center, radius, normalized axis `unit_z`, and
/// half length along the axis.
///
/// Invariant: `unit_z` is a unit vector at all times; constructors normalize
/// it once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub position: DVec3,
    pub radius: f64,
    pub unit_z: DVec3,
    pub half_length: f64,
}

impl Cylinder {
    pub fn new(position: DVec3, radius: f64, unit_z: DVec3, half_length: f64) -> Self {
        Self {
            position,
            radius,
            unit_z: unit_z.normalize(),
            half_length,
        }
    }

    /// Cylindrical coordinates (r, z) of `pos` in the cylinder's frame.
    /// r is always non-negative; z can have either sign.
    pub fn to_internal(&self, pos: DVec3) -> (f64, f64) {
        let offset = pos - self.position;
        let z = offset.dot(self.unit_z);
        let r = (offset - self.unit_z * z).length();
        (r, z)
    }

    /// Projection of `pos` onto the cylinder axis, together with the radial
    /// coordinate of `pos`.
    pub fn projected_point(&self, pos: DVec3) -> (DVec3, f64) {
        let (r, z) = self.to_internal(pos);
        (self.position + self.unit_z * z, r)
    }

    /// Almost the projection onto the axis, but pushed out radially onto the
    /// lateral surface; the second component is the radial separation from
    /// the surface.
    pub fn projected_point_on_surface(&self, pos: DVec3) -> (DVec3, f64) {
        let (r, z) = self.to_internal(pos);
        let on_axis = self.position + self.unit_z * z;
        let radial = pos - on_axis;
        let dir = if r > 0.0 {
            radial / r
        } else {
            super::orthogonal_unit(self.unit_z)
        };
        (on_axis + dir * self.radius, r - self.radius)
    }

    /// Signed distance from `pos` to the cylinder surface.
    ///
    /// Outside both cap and lateral surface the edge distance is the
    /// Pythagorean combination; inside, the least-negative of the two axis
    /// and radial clearances.
    pub fn distance(&self, pos: DVec3) -> f64 {
        let (r, z) = self.to_internal(pos);
        let dz = z.abs() - self.half_length;
        let dr = r - self.radius;

        if dz > 0.0 {
            if dr > 0.0 {
                // Beyond the cap edge.
                (dz * dz + dr * dr).sqrt()
            } else {
                dz
            }
        } else if dr > 0.0 {
            // Alongside the lateral surface.
            dr
        } else {
            // Inside.
            dr.max(dz)
        }
    }

    /// Uniform random position along the axis segment, the cylinder's
    /// one-dimensional proper measure.
    pub fn random_position(&self, rng: &mut StdRng) -> DVec3 {
        self.position + self.unit_z * (rng.gen_range(-1.0..1.0) * self.half_length)
    }

    pub fn show(&self, precision: usize) -> String {
        format!("{self:.precision$}")
    }
}

impl fmt::Display for Cylinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = f.precision().unwrap_or(6);
        write!(
            f,
            "{{({:.p$}, {:.p$}, {:.p$}), {:.p$}, ({:.p$}, {:.p$}, {:.p$}), {:.p$}}}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.radius,
            self.unit_z.x,
            self.unit_z.y,
            self.unit_z.z,
            self.half_length,
            p = p
        )
    }
}
