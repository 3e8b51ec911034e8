//! Disk shape: a flat circular binding patch with an orientation axis.

use std::fmt;

use glam::DVec3;
use rand::rngs::StdRng;

/// A disk given by center, radius, and normalized axis `unit_z`.
///
/// Disks model point-like binding sites (cylinder caps, membrane pores);
/// a particle bound to a disk sits at its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    pub position: DVec3,
    pub radius: f64,
    pub unit_z: DVec3,
}

impl Disk {
    pub fn new(position: DVec3, radius: f64, unit_z: DVec3) -> Self {
        Self {
            position,
            radius,
            unit_z: unit_z.normalize(),
        }
    }

    /// In-plane radial coordinate and axial coordinate of `pos`.
    pub fn to_internal(&self, pos: DVec3) -> (f64, f64) {
        let offset = pos - self.position;
        let z = offset.dot(self.unit_z);
        let r = (offset - self.unit_z * z).length();
        (r, z)
    }

    /// Projection onto the disk plane and the axial coefficient.
    pub fn projected_point(&self, pos: DVec3) -> (DVec3, f64) {
        let offset = pos - self.position;
        let z = offset.dot(self.unit_z);
        (pos - self.unit_z * z, z)
    }

    /// Closest point of the disk (rim-clamped) and the radial excess.
    pub fn projected_point_on_surface(&self, pos: DVec3) -> (DVec3, f64) {
        let (r, z) = self.to_internal(pos);
        let in_plane = pos - self.unit_z * z;
        if r <= self.radius {
            (in_plane, r - self.radius)
        } else {
            let dir = (in_plane - self.position) / r;
            (self.position + dir * self.radius, r - self.radius)
        }
    }

    /// Distance from `pos` to the disk.
    pub fn distance(&self, pos: DVec3) -> f64 {
        let (r, z) = self.to_internal(pos);
        let dr = r - self.radius;
        if dr <= 0.0 {
            z.abs()
        } else {
            (dr * dr + z * z).sqrt()
        }
    }

    /// Disk-bound particles sit at the center.
    pub fn random_position(&self, _rng: &mut StdRng) -> DVec3 {
        self.position
    }

    pub fn show(&self, precision: usize) -> String {
        format!("{self:.precision$}")
    }
}

impl fmt::Display for Disk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = f.precision().unwrap_or(6);
        write!(
            f,
            "{{({:.p$}, {:.p$}, {:.p$}), {:.p$}, ({:.p$}, {:.p$}, {:.p$})}}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.radius,
            self.unit_z.x,
            self.unit_z.y,
            self.unit_z.z,
            p = p
        )
    }
}
