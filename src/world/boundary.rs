//! Periodic boundary arithmetic on the cubic domain.
//!
//! The world is a cube of side `world_size` with periodic boundary
//! conditions; distances use the minimum-image convention.

use glam::DVec3;

/// Wrap a coordinate into `[0, world_size)`.
pub fn apply_boundary_coord(v: f64, world_size: f64) -> f64 {
    let wrapped = v.rem_euclid(world_size);
    // rem_euclid can return world_size itself when v is a tiny negative
    // number; fold that back to zero.
    if wrapped >= world_size {
        wrapped - world_size
    } else {
        wrapped
    }
}

/// Wrap a position into `[0, world_size)^3`.
pub fn apply_boundary(pos: DVec3, world_size: f64) -> DVec3 {
    DVec3::new(
        apply_boundary_coord(pos.x, world_size),
        apply_boundary_coord(pos.y, world_size),
        apply_boundary_coord(pos.z, world_size),
    )
}

/// The periodic image of `p0` closest to `p1`.
pub fn cyclic_transpose_coord(p0: f64, p1: f64, world_size: f64) -> f64 {
    p0 + ((p1 - p0) / world_size).round() * world_size
}

/// The periodic image of `p0` closest to `p1`, componentwise.
pub fn cyclic_transpose(p0: DVec3, p1: DVec3, world_size: f64) -> DVec3 {
    DVec3::new(
        cyclic_transpose_coord(p0.x, p1.x, world_size),
        cyclic_transpose_coord(p0.y, p1.y, world_size),
        cyclic_transpose_coord(p0.z, p1.z, world_size),
    )
}

/// Minimum-image distance between two positions.
pub fn distance(p0: DVec3, p1: DVec3, world_size: f64) -> f64 {
    (cyclic_transpose(p0, p1, world_size) - p1).length()
}
