//! Geometric primitives for the simulation domain.
//!
//! Five shapes parameterize every substrate a particle can live on: spheres,
//! cylinders, finite planes, disks, and boxes. Each shape answers the same
//! three questions — signed distance to a point, projection of a point onto
//! the shape, and a uniform random position on the shape's proper measure —
//! plus a surface projection used when particles bind to or unbind from the
//! substrate.

mod cuboid;
mod cylinder;
mod disk;
mod plane;
mod shape;
mod sphere;

pub use cuboid::Cuboid;
pub use cylinder::Cylinder;
pub use disk::Disk;
pub use plane::Plane;
pub use shape::Shape;
pub use sphere::Sphere;

use glam::DVec3;

/// Any unit vector perpendicular to `axis`.
///
/// Used to seed in-plane frames for cylinders and disks. `axis` must be
/// normalized.
pub(crate) fn orthogonal_unit(axis: DVec3) -> DVec3 {
    // Project a fixed probe vector out of the axis; fall back to a second
    // probe when the first is (anti)parallel to the axis.
    let probe = if axis.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
    (probe - axis * probe.dot(axis)).normalize()
}
