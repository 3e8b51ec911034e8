//! Axis-framed box shape, the body of bulk regions.

use std::fmt;

use glam::DVec3;
use rand::rngs::StdRng;
use rand::Rng;

/// A box given by center, an orthonormal frame, and three half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    pub position: DVec3,
    pub unit_x: DVec3,
    pub unit_y: DVec3,
    pub unit_z: DVec3,
    pub half_extent: DVec3,
}

impl Cuboid {
    pub fn new(
        position: DVec3,
        unit_x: DVec3,
        unit_y: DVec3,
        unit_z: DVec3,
        half_extent: DVec3,
    ) -> Self {
        Self {
            position,
            unit_x: unit_x.normalize(),
            unit_y: unit_y.normalize(),
            unit_z: unit_z.normalize(),
            half_extent,
        }
    }

    /// World-axis-aligned box.
    pub fn axis_aligned(position: DVec3, half_extent: DVec3) -> Self {
        Self::new(position, DVec3::X, DVec3::Y, DVec3::Z, half_extent)
    }

    /// Coefficients of `pos - center` in the box frame.
    pub fn to_internal(&self, pos: DVec3) -> DVec3 {
        let offset = pos - self.position;
        DVec3::new(
            offset.dot(self.unit_x),
            offset.dot(self.unit_y),
            offset.dot(self.unit_z),
        )
    }

    /// Projection onto the box center plane stack: returns the clamped
    /// interior point and the distance from `pos` to it.
    pub fn projected_point(&self, pos: DVec3) -> (DVec3, f64) {
        let local = self.to_internal(pos);
        let clamped = local.clamp(-self.half_extent, self.half_extent);
        let world = self.position
            + self.unit_x * clamped.x
            + self.unit_y * clamped.y
            + self.unit_z * clamped.z;
        (world, (pos - world).length())
    }

    /// Closest point on the box surface and the signed separation from it
    /// (negative when `pos` is inside).
    pub fn projected_point_on_surface(&self, pos: DVec3) -> (DVec3, f64) {
        let local = self.to_internal(pos);
        let d = local.abs() - self.half_extent;

        let surface_local = if d.max_element() > 0.0 {
            // Outside: clamp onto the surface.
            local.clamp(-self.half_extent, self.half_extent)
        } else {
            // Inside: push the least-deep coordinate out to its face.
            let mut s = local;
            if d.x >= d.y && d.x >= d.z {
                s.x = self.half_extent.x.copysign(local.x);
            } else if d.y >= d.z {
                s.y = self.half_extent.y.copysign(local.y);
            } else {
                s.z = self.half_extent.z.copysign(local.z);
            }
            s
        };

        let world = self.position
            + self.unit_x * surface_local.x
            + self.unit_y * surface_local.y
            + self.unit_z * surface_local.z;
        (world, self.distance(pos))
    }

    /// Signed distance to the box surface; negative inside.
    pub fn distance(&self, pos: DVec3) -> f64 {
        let local = self.to_internal(pos);
        let d = local.abs() - self.half_extent;
        let outside = d.max(DVec3::ZERO).length();
        let inside = d.max_element().min(0.0);
        outside + inside
    }

    /// Uniform random position over the box volume.
    pub fn random_position(&self, rng: &mut StdRng) -> DVec3 {
        self.position
            + self.unit_x * (self.half_extent.x * rng.gen_range(-1.0..1.0))
            + self.unit_y * (self.half_extent.y * rng.gen_range(-1.0..1.0))
            + self.unit_z * (self.half_extent.z * rng.gen_range(-1.0..1.0))
    }

    pub fn show(&self, precision: usize) -> String {
        format!("{self:.precision$}")
    }
}

impl fmt::Display for Cuboid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = f.precision().unwrap_or(6);
        write!(
            f,
            "{{({:.p$}, {:.p$}, {:.p$}), ({:.p$}, {:.p$}, {:.p$})}}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.half_extent.x,
            self.half_extent.y,
            self.half_extent.z,
            p = p
        )
    }
}
