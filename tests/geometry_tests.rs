//! Validation tests for shape primitives and structure geometry.
//!
//! The distance/projection contracts here are what the protective-domain
//! construction in the layers above relies on: a domain may only touch a
//! surface, never cross it, so signed distances and surface projections
//! must agree with each other everywhere.

use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use gfrd_core::geometry::{Cuboid, Cylinder, Disk, Plane, Shape, Sphere};
use gfrd_core::structure::{Structure, StructureTypeId};
use gfrd_core::world::World;

fn rng() -> StdRng {
    StdRng::seed_from_u64(1234)
}

// ============================================================================
// Cylinder distance contract
// ============================================================================

#[test]
fn test_cylinder_distance_reference_points() {
    // Cylinder at the origin, axis z, radius 1, half length 2.
    let c = Cylinder::new(DVec3::ZERO, 1.0, DVec3::Z, 2.0);

    // Beyond the cap along the axis.
    assert!((c.distance(DVec3::new(0.0, 0.0, 3.0)) - 1.0).abs() < 1e-12);

    // Beyond the cap edge: 1 out axially, 1 out radially.
    assert!((c.distance(DVec3::new(2.0, 0.0, 3.0)) - 2.0f64.sqrt()).abs() < 1e-12);

    // At the center: least-negative clearance is the radial one.
    assert!((c.distance(DVec3::ZERO) - (-1.0)).abs() < 1e-12);
}

#[test]
fn test_cylinder_distance_sign_changes_at_surface() {
    let c = Cylinder::new(DVec3::new(1.0, 2.0, 3.0), 0.5, DVec3::X, 1.0);

    assert!(c.distance(DVec3::new(1.0, 2.4, 3.0)) < 0.0);
    assert!(c.distance(DVec3::new(1.0, 2.6, 3.0)) > 0.0);
    assert!(c.distance(DVec3::new(1.0, 2.5, 3.0)).abs() < 1e-12);
}

// ============================================================================
// Surface projection invariant
// ============================================================================

#[test]
fn test_projected_surface_points_lie_on_surfaces() {
    // For points whose projection falls within the finite extents, the
    // surface projection must land on the zero isosurface of distance().
    let mut rng = rng();

    let shapes: Vec<Shape> = vec![
        Sphere::new(DVec3::new(1.0, -2.0, 0.5), 1.5).into(),
        Cylinder::new(DVec3::ZERO, 0.7, DVec3::Z, 2.0).into(),
        Plane::new(DVec3::ZERO, DVec3::X, DVec3::Y, 3.0, 3.0, false).into(),
        Disk::new(DVec3::new(0.0, 1.0, 0.0), 2.0, DVec3::Y).into(),
        Cuboid::axis_aligned(DVec3::ZERO, DVec3::splat(1.0)).into(),
    ];

    for shape in &shapes {
        for _ in 0..200 {
            // Sample near the shape so projections stay within extents.
            let p = shape.position()
                + DVec3::new(
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(-0.5..0.5),
                );
            let (on_surface, _) = shape.projected_point_on_surface(p);
            let residual = shape.distance(on_surface).abs();
            let scale = (p - shape.position()).length().max(1.0);
            assert!(
                residual <= 1e-9 * scale,
                "projection left the surface of {shape}: residual {residual}"
            );
        }
    }
}

#[test]
fn test_plane_distance_combines_edge_excess() {
    let p = Plane::new(DVec3::ZERO, DVec3::X, DVec3::Y, 1.0, 2.0, false);

    // Over the interior the distance is the normal offset.
    assert!((p.distance(DVec3::new(0.5, 1.0, -2.0)) - 2.0).abs() < 1e-12);

    // Past both edges: Pythagoras over the excesses and the offset.
    let d = p.distance(DVec3::new(2.0, 3.0, 1.0));
    assert!((d - (1.0f64 + 1.0 + 1.0).sqrt()).abs() < 1e-12);
}

// ============================================================================
// Random positions stay on the proper measure
// ============================================================================

#[test]
fn test_random_positions_respect_shape_measure() {
    let mut rng = rng();

    let cylinder = Cylinder::new(DVec3::new(1.0, 1.0, 0.0), 0.5, DVec3::Z, 2.0);
    for _ in 0..100 {
        let p = cylinder.random_position(&mut rng);
        // On the axis, within the half length.
        assert!((p - DVec3::new(1.0, 1.0, p.z)).length() < 1e-12);
        assert!((p.z - 0.0).abs() <= 2.0);
    }

    let plane = Plane::new(DVec3::ZERO, DVec3::X, DVec3::Y, 1.0, 2.0, false);
    for _ in 0..100 {
        let p = plane.random_position(&mut rng);
        assert!(p.z.abs() < 1e-12);
        assert!(p.x.abs() <= 1.0 && p.y.abs() <= 2.0);
    }

    let cuboid = Cuboid::axis_aligned(DVec3::splat(2.0), DVec3::new(1.0, 0.5, 0.25));
    for _ in 0..100 {
        let p = cuboid.random_position(&mut rng);
        assert!(cuboid.distance(p) <= 0.0);
    }
}

#[test]
fn test_spherical_structure_samples_uniformly_on_shell() {
    let mut world = World::new(10.0, 5);
    let root = world.default_structure_id();
    let shell_id = world
        .add_structure(Structure::spherical_surface(
            "shell",
            StructureTypeId(2),
            root,
            DVec3::new(1.0, 0.0, 0.0),
            2.0,
        ))
        .unwrap();
    let shell = world.get_structure(shell_id).unwrap();

    let mut rng = rng();
    let mut mean = DVec3::ZERO;
    let n = 2000;
    for _ in 0..n {
        let p = shell.random_position(&mut rng);
        assert!(((p - DVec3::new(1.0, 0.0, 0.0)).length() - 2.0).abs() < 1e-9);
        mean += p;
    }
    mean /= n as f64;
    // Uniform sampling centers on the sphere center; 3 sigma of the mean of
    // n uniform points on a radius-2 shell is about 2 sqrt(3/n).
    assert!(
        (mean - DVec3::new(1.0, 0.0, 0.0)).length() < 3.0 * 2.0 * (1.0 / n as f64).sqrt() * 1.8,
        "shell sampling is biased: mean {mean}"
    );
}

// ============================================================================
// Structure transitions
// ============================================================================

#[test]
fn test_rod_association_and_dissociation_round_trip() {
    let mut world = World::new(10.0, 5);
    let root = world.default_structure_id();
    let rod_id = world
        .add_structure(Structure::cylindrical_surface(
            "rod",
            StructureTypeId(1),
            root,
            DVec3::new(5.0, 5.0, 1.0),
            0.1,
            DVec3::Z,
            8.0,
        ))
        .unwrap();

    let bulk = world.get_structure(root).unwrap();
    let rod = world.get_structure(rod_id).unwrap();

    let mut rng = rng();

    // Bind: project onto the axis.
    let (bound, sid) = gfrd_core::structure::transition(
        bulk,
        rod,
        DVec3::new(5.3, 5.0, 4.0),
        0.0,
        0.0,
        &mut rng,
    )
    .unwrap();
    assert_eq!(sid, rod_id);
    assert!((bound - DVec3::new(5.0, 5.0, 4.0)).length() < 1e-12);

    // Unbind: radial displacement within the reaction annulus.
    let (released, sid) =
        gfrd_core::structure::transition(rod, bulk, bound, 0.2, 0.05, &mut rng).unwrap();
    assert_eq!(sid, root);
    let radial = released - bound;
    assert!(radial.dot(DVec3::Z).abs() < 1e-12);
    assert!(radial.length() >= 0.3 - 1e-12 && radial.length() <= 0.35 + 1e-12);
}
