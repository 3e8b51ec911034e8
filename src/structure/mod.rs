//! Structures: named geometric substrates particles live on.
//!
//! A structure wraps a shape with identity and hierarchy: every structure
//! has a parent, and the whole set forms a forest rooted at the bulk region
//! created with the world. Per-kind behavior — random sampling, Brownian
//! displacement, reaction volumes, dissociation geometry — dispatches on
//! the shape tag. Cross-structure transitions live in [`transitions`].
//!
//! Reference: Sokolowski et al., J Chem Phys 2019 (eGFRD in all dimensions)

mod transitions;

pub use transitions::{pair_reaction_transition, transition, transition_pair};

use std::f64::consts::PI;
use std::fmt;

use glam::DVec3;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, UnitCircle, UnitSphere};
use serde::{Deserialize, Serialize};

use crate::error::{GfrdError, Result};
use crate::geometry::{Cuboid, Cylinder, Disk, Plane, Shape, Sphere};
use crate::physics;
use crate::world::boundary;
use crate::world::SpeciesInfo;

/// Identifier of a structure instance. Assigned exactly once, by the world,
/// when the structure is registered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StructureId(pub u64);

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SID({})", self.0)
    }
}

/// Identifier of a structure *type*, the species-level classification shared
/// by all structures a given species can bind to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StructureTypeId(pub u64);

impl fmt::Display for StructureTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "STID({})", self.0)
    }
}

/// Structure type of the default bulk region.
pub const DEFAULT_STRUCTURE_TYPE: StructureTypeId = StructureTypeId(0);

/// Surfaces must keep at least this clearance factor between a particle and
/// themselves when placing particles near a surface.
pub const MINIMAL_SEPARATION_FACTOR: f64 = 1.0 + 1e-7;

/// Behavioral variant of a structure, derived from its shape tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureKind {
    /// Bulk cuboidal region; particles diffuse in 3-D.
    Cuboidal,
    /// Spherical surface.
    Spherical,
    /// Cylindrical surface ("rod"); particles diffuse along the axis.
    Cylindrical,
    /// Disk-shaped binding site; bound particles are immobile.
    Disk,
    /// Planar surface; particles diffuse in 2-D.
    Planar,
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StructureKind::Cuboidal => "cuboidal region",
            StructureKind::Spherical => "spherical surface",
            StructureKind::Cylindrical => "cylindrical surface",
            StructureKind::Disk => "disk surface",
            StructureKind::Planar => "planar surface",
        };
        f.write_str(name)
    }
}

/// A named substrate with identity, hierarchy, and a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    name: String,
    id: Option<StructureId>,
    structure_type: StructureTypeId,
    parent: StructureId,
    shape: Shape,
}

impl Structure {
    /// A structure not yet registered with a world; `id` is assigned by the
    /// world on registration.
    pub fn new(
        name: impl Into<String>,
        structure_type: StructureTypeId,
        parent: StructureId,
        shape: Shape,
    ) -> Self {
        Self {
            name: name.into(),
            id: None,
            structure_type,
            parent,
            shape,
        }
    }

    // ------------------------------------------------------------------
    // Factories. These take the corner-based description used by model
    // setup code and normalize to the center-based shape representation.
    // ------------------------------------------------------------------

    pub fn cuboidal_region(
        name: impl Into<String>,
        structure_type: StructureTypeId,
        parent: StructureId,
        corner: DVec3,
        extent: DVec3,
    ) -> Self {
        let half_extent = extent / 2.0;
        let shape = Cuboid::axis_aligned(corner + half_extent, half_extent);
        Self::new(name, structure_type, parent, shape.into())
    }

    pub fn planar_surface(
        name: impl Into<String>,
        structure_type: StructureTypeId,
        parent: StructureId,
        corner: DVec3,
        unit_x: DVec3,
        unit_y: DVec3,
        lx: f64,
        ly: f64,
    ) -> Self {
        Self::planar_surface_impl(name, structure_type, parent, corner, unit_x, unit_y, lx, ly, true)
    }

    pub fn double_sided_planar_surface(
        name: impl Into<String>,
        structure_type: StructureTypeId,
        parent: StructureId,
        corner: DVec3,
        unit_x: DVec3,
        unit_y: DVec3,
        lx: f64,
        ly: f64,
    ) -> Self {
        Self::planar_surface_impl(name, structure_type, parent, corner, unit_x, unit_y, lx, ly, false)
    }

    #[allow(clippy::too_many_arguments)]
    fn planar_surface_impl(
        name: impl Into<String>,
        structure_type: StructureTypeId,
        parent: StructureId,
        corner: DVec3,
        unit_x: DVec3,
        unit_y: DVec3,
        lx: f64,
        ly: f64,
        one_sided: bool,
    ) -> Self {
        debug_assert!((unit_x.length() - 1.0).abs() < 1e-12);
        debug_assert!((unit_y.length() - 1.0).abs() < 1e-12);

        // The caller gives the corner and full lengths; the shape stores the
        // center and half lengths.
        let half_lx = lx / 2.0;
        let half_ly = ly / 2.0;
        let center = corner + unit_x * half_lx + unit_y * half_ly;
        let shape = Plane::new(center, unit_x, unit_y, half_lx, half_ly, one_sided);
        Self::new(name, structure_type, parent, shape.into())
    }

    pub fn cylindrical_surface(
        name: impl Into<String>,
        structure_type: StructureTypeId,
        parent: StructureId,
        corner: DVec3,
        radius: f64,
        unit_z: DVec3,
        length: f64,
    ) -> Self {
        debug_assert!((unit_z.length() - 1.0).abs() < 1e-12);

        let half_length = length / 2.0;
        let center = corner + unit_z * half_length;
        let shape = Cylinder::new(center, radius, unit_z, half_length);
        Self::new(name, structure_type, parent, shape.into())
    }

    pub fn disk_surface(
        name: impl Into<String>,
        structure_type: StructureTypeId,
        parent: StructureId,
        center: DVec3,
        radius: f64,
        unit_z: DVec3,
    ) -> Self {
        debug_assert!((unit_z.length() - 1.0).abs() < 1e-12);
        Self::new(name, structure_type, parent, Disk::new(center, radius, unit_z).into())
    }

    pub fn spherical_surface(
        name: impl Into<String>,
        structure_type: StructureTypeId,
        parent: StructureId,
        center: DVec3,
        radius: f64,
    ) -> Self {
        Self::new(name, structure_type, parent, Sphere::new(center, radius).into())
    }

    // ------------------------------------------------------------------
    // Identity and hierarchy.
    // ------------------------------------------------------------------

    /// The structure id. Errors until the structure has been registered.
    pub fn id(&self) -> Result<StructureId> {
        self.id
            .ok_or_else(|| GfrdError::illegal_state(format!("id for structure '{}' not defined", self.name)))
    }

    /// Assign the id. May be called exactly once.
    pub(crate) fn set_id(&mut self, id: StructureId) -> Result<()> {
        if self.id.is_some() {
            return Err(GfrdError::illegal_state(format!(
                "structure '{}' already has an id",
                self.name
            )));
        }
        self.id = Some(id);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn structure_type(&self) -> StructureTypeId {
        self.structure_type
    }

    /// Id of the parent structure; the root bulk region is its own parent.
    pub fn parent_id(&self) -> StructureId {
        self.parent
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> StructureKind {
        match self.shape {
            Shape::Cuboid(_) => StructureKind::Cuboidal,
            Shape::Sphere(_) => StructureKind::Spherical,
            Shape::Cylinder(_) => StructureKind::Cylindrical,
            Shape::Disk(_) => StructureKind::Disk,
            Shape::Plane(_) => StructureKind::Planar,
        }
    }

    pub fn position(&self) -> DVec3 {
        self.shape.position()
    }

    fn unsupported(&self, operation: &str) -> GfrdError {
        GfrdError::not_supported(format!("{} on a {}", operation, self.kind()))
    }

    // ------------------------------------------------------------------
    // Measures and projections.
    // ------------------------------------------------------------------

    pub fn distance(&self, pos: DVec3) -> f64 {
        self.shape.distance(pos)
    }

    pub fn project_point(&self, pos: DVec3) -> (DVec3, f64) {
        self.shape.projected_point(pos)
    }

    pub fn project_point_on_surface(&self, pos: DVec3) -> (DVec3, f64) {
        self.shape.projected_point_on_surface(pos)
    }

    // ------------------------------------------------------------------
    // Random sampling.
    // ------------------------------------------------------------------

    /// Uniform random position on the structure's proper measure.
    pub fn random_position(&self, rng: &mut StdRng) -> DVec3 {
        match &self.shape {
            // A spherical *surface* samples uniformly over the sphere, not
            // the trivial center the bare shape reports.
            Shape::Sphere(s) => {
                let dir: [f64; 3] = UnitSphere.sample(rng);
                s.position + DVec3::from(dir) * s.radius
            }
            other => other.random_position(rng),
        }
    }

    /// A vector of length `r` uniform over the structure's diffusion
    /// directions.
    pub fn random_vector(&self, r: f64, rng: &mut StdRng) -> Result<DVec3> {
        match &self.shape {
            Shape::Cuboid(_) => {
                let dir: [f64; 3] = UnitSphere.sample(rng);
                Ok(DVec3::from(dir) * r)
            }
            Shape::Cylinder(c) => {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                Ok(c.unit_z * (sign * r))
            }
            Shape::Plane(p) => {
                let dir: [f64; 2] = UnitCircle.sample(rng);
                Ok(p.unit_x * (dir[0] * r) + p.unit_y * (dir[1] * r))
            }
            Shape::Disk(d) => {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                Ok(d.unit_z * (sign * r))
            }
            Shape::Sphere(_) => Err(self.unsupported("random_vector")),
        }
    }

    /// Gaussian Brownian-dynamics displacement with per-component mean
    /// `mean` and standard deviation `r`, restricted to the structure's
    /// diffusion directions.
    pub fn bd_displacement(&self, mean: f64, r: f64, rng: &mut StdRng) -> Result<DVec3> {
        let mut gauss = |rng: &mut StdRng| -> f64 {
            let theta: f64 = rng.sample(StandardNormal);
            mean + r * theta
        };
        match &self.shape {
            Shape::Cuboid(_) => Ok(DVec3::new(gauss(rng), gauss(rng), gauss(rng))),
            Shape::Cylinder(c) => Ok(c.unit_z * gauss(rng)),
            Shape::Plane(p) => Ok(p.unit_x * gauss(rng) + p.unit_y * gauss(rng)),
            // Disk-bound particles are immobile.
            Shape::Disk(_) => Ok(DVec3::ZERO),
            Shape::Sphere(_) => Err(self.unsupported("bd_displacement")),
        }
    }

    // ------------------------------------------------------------------
    // Reaction measures.
    // ------------------------------------------------------------------

    /// Intrinsic pair rate reduced to the structure's 1-D interparticle
    /// coordinate.
    pub fn get_1d_rate_geminate(&self, k: f64, r01: f64) -> Result<f64> {
        match &self.shape {
            Shape::Cylinder(_) | Shape::Disk(_) => Ok(k),
            Shape::Plane(_) => Ok(k / (2.0 * PI * r01)),
            Shape::Cuboid(_) => Ok(k / (4.0 * PI * r01 * r01)),
            Shape::Sphere(_) => Err(self.unsupported("get_1d_rate_geminate")),
        }
    }

    /// Surface binding rate reduced to the 1-D approach coordinate.
    pub fn get_1d_rate_surface(&self, k: f64, r0: f64) -> Result<f64> {
        match &self.shape {
            Shape::Cylinder(c) => Ok(k / (2.0 * PI * (c.radius + r0))),
            // Flat approach: the contact measure is already 1-D.
            Shape::Plane(_) | Shape::Disk(_) => Ok(k),
            Shape::Cuboid(_) | Shape::Sphere(_) => Err(self.unsupported("get_1d_rate_surface")),
        }
    }

    /// Measure of the pair reaction zone at contact distance `r01` with
    /// reaction length `rl`, in the structure's diffusion dimension.
    pub fn particle_reaction_volume(&self, r01: f64, rl: f64) -> Result<f64> {
        match &self.shape {
            Shape::Cylinder(_) | Shape::Disk(_) => Ok(rl),
            Shape::Plane(_) => {
                let outer = r01 + rl;
                Ok(PI * (outer * outer - r01 * r01))
            }
            Shape::Cuboid(_) => {
                let outer = r01 + rl;
                Ok(4.0 / 3.0 * PI * (outer * outer * outer - r01 * r01 * r01))
            }
            Shape::Sphere(_) => Err(self.unsupported("particle_reaction_volume")),
        }
    }

    /// Measure of the surface binding zone for a particle of radius `r0`
    /// and reaction length `rl`.
    pub fn surface_reaction_volume(&self, r0: f64, rl: f64) -> Result<f64> {
        match &self.shape {
            Shape::Cylinder(c) => {
                let rc = c.radius + r0;
                let rcl = rc + rl;
                Ok(PI * (rcl * rcl - rc * rc))
            }
            // Perpendicular approach through a slab of thickness rl.
            Shape::Plane(_) | Shape::Disk(_) => Ok(rl),
            Shape::Cuboid(_) | Shape::Sphere(_) => {
                Err(self.unsupported("surface_reaction_volume"))
            }
        }
    }

    /// Minimal center distance a particle of radius `radius` must keep from
    /// the structure when placed next to it.
    pub fn minimal_distance(&self, radius: f64) -> f64 {
        match &self.shape {
            Shape::Cylinder(c) => {
                (c.radius + radius) * MINIMAL_SEPARATION_FACTOR - c.radius
            }
            Shape::Sphere(s) => (s.radius + radius) * MINIMAL_SEPARATION_FACTOR - s.radius,
            Shape::Plane(_) | Shape::Disk(_) | Shape::Cuboid(_) => {
                radius * MINIMAL_SEPARATION_FACTOR
            }
        }
    }

    /// Did the displaced particle cross the surface?
    pub fn bounced(&self, dist_to_surface: f64, particle_radius: f64) -> bool {
        dist_to_surface < particle_radius
    }

    /// Is the particle within the surface binding zone?
    pub fn in_reaction_volume(&self, dist_to_surface: f64, particle_radius: f64, rl: f64) -> bool {
        dist_to_surface - particle_radius <= rl
    }

    // ------------------------------------------------------------------
    // Dissociation geometry.
    // ------------------------------------------------------------------

    /// Unit vector along which a particle unbinds from the surface.
    pub fn surface_dissociation_unit_vector(&self, rng: &mut StdRng) -> Result<DVec3> {
        match &self.shape {
            Shape::Cylinder(c) => {
                let dir: [f64; 3] = UnitSphere.sample(rng);
                let v = DVec3::from(dir);
                // Strip the axial component to get a radial direction.
                Ok((v - c.unit_z * v.dot(c.unit_z)).normalize())
            }
            Shape::Plane(p) => Ok(p.unit_z * self.side_sign(p, rng)),
            Shape::Disk(d) => {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                Ok(d.unit_z * sign)
            }
            Shape::Cuboid(_) | Shape::Sphere(_) => {
                Err(self.unsupported("surface_dissociation_unit_vector"))
            }
        }
    }

    fn side_sign(&self, plane: &Plane, rng: &mut StdRng) -> f64 {
        if plane.one_sided || rng.gen_bool(0.5) {
            1.0
        } else {
            -1.0
        }
    }

    /// Displacement from the surface for a single unbinding particle of
    /// contact distance `r0`, sampled over the reaction zone of length `rl`.
    pub fn surface_dissociation_vector(
        &self,
        rng: &mut StdRng,
        r0: f64,
        rl: f64,
    ) -> Result<DVec3> {
        match &self.shape {
            Shape::Cylinder(c) => {
                // Radial annulus [R + r0, R + r0 + rl]; the length is drawn
                // with weight proportional to distance (uniform in area).
                let x: f64 = rng.gen();
                let rr = c.radius + r0;
                let rrl = rr + rl;
                let length = (x * (rrl * rrl - rr * rr) + rr * rr).sqrt();

                let dir = self.surface_dissociation_unit_vector(rng)?;
                Ok(dir * length)
            }
            Shape::Plane(p) => {
                let x: f64 = rng.gen();
                Ok(p.unit_z * (self.side_sign(p, rng) * (r0 + x * rl)))
            }
            Shape::Disk(d) => {
                let x: f64 = rng.gen();
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                Ok(d.unit_z * (sign * (r0 + x * rl)))
            }
            Shape::Cuboid(_) | Shape::Sphere(_) => {
                Err(self.unsupported("surface_dissociation_vector"))
            }
        }
    }

    /// Positions for the two products of a geminate dissociation on this
    /// structure, split around the old position `op` by the diffusion-share
    /// rule.
    pub fn geminate_dissociation_positions(
        &self,
        rng: &mut StdRng,
        s0: &SpeciesInfo,
        s1: &SpeciesInfo,
        op: DVec3,
        rl: f64,
    ) -> Result<(DVec3, DVec3)> {
        let r01 = s0.radius + s1.radius;
        let d01 = s0.diffusion + s1.diffusion;

        let x: f64 = rng.gen();
        let length = x * rl + r01;
        let m = self.random_vector(length, rng)?;

        if d01 == 0.0 {
            // Both products immobile; split the separation evenly.
            return Ok((op - m * 0.5, op + m * 0.5));
        }
        Ok((op - m * (s0.diffusion / d01), op + m * (s1.diffusion / d01)))
    }

    /// Positions for a surface-bound product and a bulk product of a
    /// dissociation happening on this surface ("special" geminate split).
    ///
    /// The bulk partner leaves through a polar cone that keeps it clear of
    /// the surface body; the radial length is uniform in cubic measure over
    /// the reaction zone.
    pub fn special_geminate_dissociation_positions(
        &self,
        rng: &mut StdRng,
        s_surf: &SpeciesInfo,
        s_bulk: &SpeciesInfo,
        op_surf: DVec3,
        rl: f64,
    ) -> Result<(DVec3, DVec3)> {
        match &self.shape {
            Shape::Cylinder(c) => {
                // Species living on the rod must be thicker than the rod.
                if c.radius >= s_surf.radius {
                    return Err(GfrdError::illegal_state(format!(
                        "surface species radius {} does not cover rod radius {}",
                        s_surf.radius, c.radius
                    )));
                }

                let r01 = s_bulk.radius + s_surf.radius;
                let d01 = s_bulk.diffusion + s_surf.diffusion;
                let d_bulk_frac = if d01 > 0.0 { s_bulk.diffusion / d01 } else { 0.5 };
                let d_surf_frac = if d01 > 0.0 { s_surf.diffusion / d01 } else { 0.5 };

                // Polar cone keeping the bulk partner off the rod body.
                let theta_min = ((c.radius + s_bulk.radius) / r01).asin();
                let theta = theta_min + rng.gen::<f64>() * (PI - 2.0 * theta_min);
                let phi = rng.gen::<f64>() * 2.0 * PI;

                // Radial length uniform in cubic measure over
                // [r01, r01 + rl].
                let x: f64 = rng.gen();
                let r01l = r01 + rl;
                let length = (x * (r01l.powi(3) - r01.powi(3)) + r01.powi(3)).cbrt();

                let unit_z = c.unit_z;
                let unit_x = crate::geometry::orthogonal_unit(unit_z);
                let unit_y = unit_x.cross(unit_z).normalize();

                let sin_theta = theta.sin();
                let x_len = length * sin_theta * phi.cos();
                let y_len = length * sin_theta * phi.sin();
                let z_len = length * theta.cos();

                // The rod-bound partner only recoils along the axis.
                let surf_pos = op_surf - unit_z * (z_len * d_surf_frac);
                let bulk_pos =
                    op_surf + unit_x * x_len + unit_y * y_len + unit_z * (z_len * d_bulk_frac);

                Ok((surf_pos, bulk_pos))
            }
            Shape::Disk(d) => {
                // Disk caps release the bulk partner along the axis only.
                let r01 = s_bulk.radius + s_surf.radius;
                let x: f64 = rng.gen();
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let bulk_pos = op_surf + d.unit_z * (sign * (r01 + x * rl));
                Ok((op_surf, bulk_pos))
            }
            _ => Err(self.unsupported("special_geminate_dissociation_positions")),
        }
    }

    /// Sample the post-dissociation interparticle distance for a geminate
    /// pair on this structure's 1-D coordinate.
    pub fn draw_r_gbd(&self, rnd: f64, r01: f64, dt: f64, d01: f64) -> Result<f64> {
        match &self.shape {
            Shape::Cylinder(_) | Shape::Disk(_) => {
                Ok(physics::draw_r_gbd_1d(rnd, r01, dt, d01))
            }
            _ => Err(self.unsupported("draw_r_gbd")),
        }
    }

    /// Interparticle vector after a geminate dissociation in the structure's
    /// 1-D coordinate.
    pub fn dissociation_vector(
        &self,
        rng: &mut StdRng,
        r01: f64,
        dt: f64,
        d01: f64,
    ) -> Result<DVec3> {
        let r = self.draw_r_gbd(rng.gen(), r01, dt, d01)?;
        self.random_vector(r, rng)
    }

    /// Acceptance probability of a candidate Brownian back-step into the
    /// reaction zone.
    ///
    /// Drift-free formula; the particles' drift velocities are accepted for
    /// signature compatibility and must be zero.
    pub fn p_acceptance(
        &self,
        k_a: f64,
        dt: f64,
        r01: f64,
        d0: f64,
        d1: f64,
        v0: f64,
        v1: f64,
    ) -> Result<f64> {
        match &self.shape {
            Shape::Cylinder(_) | Shape::Disk(_) => {
                if v0 != 0.0 || v1 != 0.0 {
                    return Err(GfrdError::not_supported(
                        "drift-dependent acceptance is not implemented",
                    ));
                }
                Ok(0.5 * k_a * dt
                    / (physics::i_bd_1d(r01, dt, d0) + physics::i_bd_1d(r01, dt, d1)))
            }
            _ => Err(self.unsupported("p_acceptance")),
        }
    }

    // ------------------------------------------------------------------
    // Boundary handling.
    // ------------------------------------------------------------------

    /// Deflect a displacement at the structure edge.
    ///
    /// Planar surfaces reflect the normal component when the trajectory
    /// crosses the plane; all other structures pass the displacement
    /// through unchanged. The flag reports whether a crossing happened.
    pub fn deflect(&self, pos: DVec3, displacement: DVec3) -> (DVec3, bool) {
        match &self.shape {
            Shape::Plane(p) => {
                let (_, _, z0) = p.to_internal(pos);
                let new_pos = pos + displacement;
                let (_, _, z1) = p.to_internal(new_pos);
                if z0 * z1 < 0.0 {
                    // Crossed the plane; fold the overshoot back.
                    (new_pos - p.unit_z * (2.0 * z1), true)
                } else {
                    (new_pos, false)
                }
            }
            _ => (pos + displacement, false),
        }
    }

    /// Re-establish the structure's positional invariant after a move, then
    /// wrap into the periodic domain.
    ///
    /// Bulk regions only wrap; surfaces also project the position back onto
    /// their proper measure (axis, plane, center, or spherical shell).
    pub fn apply_boundary(&self, pos: DVec3, world_size: f64) -> Result<(DVec3, StructureId)> {
        let constrained = match &self.shape {
            Shape::Cuboid(_) => pos,
            Shape::Cylinder(c) => c.projected_point(pos).0,
            Shape::Plane(p) => p.projected_point(pos).0,
            Shape::Disk(d) => d.position,
            Shape::Sphere(s) => s.projected_point_on_surface(pos).0,
        };
        Ok((boundary::apply_boundary(constrained, world_size), self.id()?))
    }

    /// Transpose `pos` to its periodic image closest to this structure.
    pub fn cyclic_transpose(&self, pos: DVec3, world_size: f64) -> DVec3 {
        boundary::cyclic_transpose(pos, self.position(), world_size)
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "Structure('{}', {}, {})", self.name, id, self.structure_type),
            None => write!(f, "Structure('{}', unassigned, {})", self.name, self.structure_type),
        }
    }
}
