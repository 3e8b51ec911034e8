//! Sum type over the shape primitives.
//!
//! Generic algorithms take `Shape` and dispatch by tag; this replaces the
//! trait-object plumbing a shape hierarchy would otherwise need and keeps
//! cross-shape transition tables statically exhaustive.

use std::fmt;

use glam::DVec3;
use rand::rngs::StdRng;

use super::{Cuboid, Cylinder, Disk, Plane, Sphere};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Cylinder(Cylinder),
    Plane(Plane),
    Disk(Disk),
    Cuboid(Cuboid),
}

impl Shape {
    /// Center of the shape.
    pub fn position(&self) -> DVec3 {
        match self {
            Shape::Sphere(s) => s.position,
            Shape::Cylinder(c) => c.position,
            Shape::Plane(p) => p.position,
            Shape::Disk(d) => d.position,
            Shape::Cuboid(b) => b.position,
        }
    }

    /// Signed (where defined) distance from `pos` to the shape surface.
    pub fn distance(&self, pos: DVec3) -> f64 {
        match self {
            Shape::Sphere(s) => s.distance(pos),
            Shape::Cylinder(c) => c.distance(pos),
            Shape::Plane(p) => p.distance(pos),
            Shape::Disk(d) => d.distance(pos),
            Shape::Cuboid(b) => b.distance(pos),
        }
    }

    /// Projection of `pos` onto the shape's axis or plane, plus the
    /// perpendicular coordinate.
    pub fn projected_point(&self, pos: DVec3) -> (DVec3, f64) {
        match self {
            Shape::Sphere(s) => s.projected_point(pos),
            Shape::Cylinder(c) => c.projected_point(pos),
            Shape::Plane(p) => p.projected_point(pos),
            Shape::Disk(d) => d.projected_point(pos),
            Shape::Cuboid(b) => b.projected_point(pos),
        }
    }

    /// Projection of `pos` onto the shape surface, plus the separation.
    pub fn projected_point_on_surface(&self, pos: DVec3) -> (DVec3, f64) {
        match self {
            Shape::Sphere(s) => s.projected_point_on_surface(pos),
            Shape::Cylinder(c) => c.projected_point_on_surface(pos),
            Shape::Plane(p) => p.projected_point_on_surface(pos),
            Shape::Disk(d) => d.projected_point_on_surface(pos),
            Shape::Cuboid(b) => b.projected_point_on_surface(pos),
        }
    }

    /// Uniform random position on the shape's proper measure.
    pub fn random_position(&self, rng: &mut StdRng) -> DVec3 {
        match self {
            Shape::Sphere(s) => s.random_position(rng),
            Shape::Cylinder(c) => c.random_position(rng),
            Shape::Plane(p) => p.random_position(rng),
            Shape::Disk(d) => d.random_position(rng),
            Shape::Cuboid(b) => b.random_position(rng),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Sphere(s) => write!(f, "Sphere{s}"),
            Shape::Cylinder(c) => write!(f, "Cylinder{c}"),
            Shape::Plane(p) => write!(f, "Plane{p}"),
            Shape::Disk(d) => write!(f, "Disk{d}"),
            Shape::Cuboid(b) => write!(f, "Box{b}"),
        }
    }
}

impl From<Sphere> for Shape {
    fn from(s: Sphere) -> Self {
        Shape::Sphere(s)
    }
}

impl From<Cylinder> for Shape {
    fn from(c: Cylinder) -> Self {
        Shape::Cylinder(c)
    }
}

impl From<Plane> for Shape {
    fn from(p: Plane) -> Self {
        Shape::Plane(p)
    }
}

impl From<Disk> for Shape {
    fn from(d: Disk) -> Self {
        Shape::Disk(d)
    }
}

impl From<Cuboid> for Shape {
    fn from(b: Cuboid) -> Self {
        Shape::Cuboid(b)
    }
}
