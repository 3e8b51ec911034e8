//! The world: particle container, structure forest, and species registry.
//!
//! All particle state lives in a [`MatrixSpace`] spatial hash; structures
//! form a forest rooted at the bulk cuboidal region created together with
//! the world. Mutation during event execution goes through a
//! [`Transaction`], which records enough state to roll back a partially
//! applied event.

pub mod boundary;
mod matrix_space;
mod particle;
mod transaction;

pub use matrix_space::{MatrixSpace, ParticleNeighbor};
pub use particle::{Particle, ParticleId, SpeciesId, SpeciesInfo};
pub use transaction::Transaction;

use std::collections::BTreeMap;

use glam::DVec3;

use crate::error::{GfrdError, Result};
use crate::geometry::Sphere;
use crate::structure::{Structure, StructureId, DEFAULT_STRUCTURE_TYPE};

/// The simulation world.
#[derive(Debug, Clone)]
pub struct World {
    pmat: MatrixSpace,
    structures: BTreeMap<StructureId, Structure>,
    species: BTreeMap<SpeciesId, SpeciesInfo>,
    default_structure: StructureId,
    next_particle_id: u64,
    next_structure_id: u64,
}

impl World {
    /// A world of side `world_size` hashed into `matrix_size^3` cells, with
    /// the root bulk region covering the whole cube.
    pub fn new(world_size: f64, matrix_size: usize) -> Self {
        let root_id = StructureId(1);
        let mut root = Structure::cuboidal_region(
            "world",
            DEFAULT_STRUCTURE_TYPE,
            root_id, // the root is its own parent
            DVec3::ZERO,
            DVec3::splat(world_size),
        );
        // Fresh structure, single assignment.
        root.set_id(root_id).expect("fresh structure accepts an id");

        let mut structures = BTreeMap::new();
        structures.insert(root_id, root);

        log::info!(
            "created world: size {world_size}, {matrix_size}^3 cells of {}",
            world_size / matrix_size as f64
        );

        Self {
            pmat: MatrixSpace::new(world_size, matrix_size),
            structures,
            species: BTreeMap::new(),
            default_structure: root_id,
            next_particle_id: 0,
            next_structure_id: 2,
        }
    }

    // ------------------------------------------------------------------
    // Sizing and boundary arithmetic.
    // ------------------------------------------------------------------

    pub fn num_particles(&self) -> usize {
        self.pmat.len()
    }

    pub fn world_size(&self) -> f64 {
        self.pmat.world_size()
    }

    pub fn matrix_size(&self) -> usize {
        self.pmat.matrix_size()
    }

    pub fn cell_size(&self) -> f64 {
        self.pmat.cell_size()
    }

    /// Minimum-image distance.
    pub fn distance(&self, lhs: DVec3, rhs: DVec3) -> f64 {
        boundary::distance(lhs, rhs, self.world_size())
    }

    pub fn apply_boundary(&self, pos: DVec3) -> DVec3 {
        boundary::apply_boundary(pos, self.world_size())
    }

    pub fn apply_boundary_coord(&self, v: f64) -> f64 {
        boundary::apply_boundary_coord(v, self.world_size())
    }

    pub fn cyclic_transpose(&self, p0: DVec3, p1: DVec3) -> DVec3 {
        boundary::cyclic_transpose(p0, p1, self.world_size())
    }

    pub fn cyclic_transpose_coord(&self, p0: f64, p1: f64) -> f64 {
        boundary::cyclic_transpose_coord(p0, p1, self.world_size())
    }

    /// Diffusion-weighted center of mass of a pair, under the minimum-image
    /// convention and wrapped into the domain.
    pub fn calculate_pair_com(&self, p1: DVec3, p2: DVec3, d1: f64, d2: f64) -> DVec3 {
        let p2t = self.cyclic_transpose(p2, p1);
        self.apply_boundary((p1 * d2 + p2t * d1) / (d1 + d2))
    }

    // ------------------------------------------------------------------
    // Species registry.
    // ------------------------------------------------------------------

    pub fn add_species(&mut self, species: SpeciesInfo) {
        self.species.insert(species.id, species);
    }

    pub fn get_species(&self, id: SpeciesId) -> Result<&SpeciesInfo> {
        self.species
            .get(&id)
            .ok_or_else(|| GfrdError::not_found(format!("no such species: id={id}")))
    }

    pub fn get_species_list(&self) -> impl Iterator<Item = &SpeciesInfo> {
        self.species.values()
    }

    // ------------------------------------------------------------------
    // Particle CRUD.
    // ------------------------------------------------------------------

    /// Create a particle of species `sid` at `pos` (wrapped into the
    /// domain), resolving radius and diffusion from the registry. No
    /// overlap check; layers that need one call `check_overlap` first.
    pub fn new_particle(&mut self, sid: SpeciesId, pos: DVec3) -> Result<(ParticleId, Particle)> {
        let species = self.get_species(sid)?;
        let particle = Particle::new(
            sid,
            Sphere::new(self.apply_boundary(pos), species.radius),
            species.diffusion,
        );

        self.next_particle_id += 1;
        let id = ParticleId(self.next_particle_id);
        self.pmat.update(id, particle);
        Ok((id, particle))
    }

    /// Insert or move a particle; the position is wrapped. Returns `true`
    /// when the id was not present before.
    pub fn update_particle(&mut self, id: ParticleId, particle: Particle) -> bool {
        let wrapped = particle.with_position(self.apply_boundary(particle.position()));
        self.pmat.update(id, wrapped)
    }

    pub fn remove_particle(&mut self, id: ParticleId) -> bool {
        self.pmat.erase(id)
    }

    pub fn get_particle(&self, id: ParticleId) -> Result<(ParticleId, Particle)> {
        self.pmat
            .get(id)
            .map(|particle| (id, *particle))
            .ok_or_else(|| GfrdError::not_found(format!("no such particle: id={id}")))
    }

    pub fn has_particle(&self, id: ParticleId) -> bool {
        self.pmat.contains(id)
    }

    /// Snapshot of all particles in id order.
    pub fn get_particles(&self) -> Vec<(ParticleId, Particle)> {
        self.pmat.iter().map(|(id, particle)| (id, *particle)).collect()
    }

    /// All particles overlapping `query`, sorted ascending by signed edge
    /// distance; ids in `ignore` are skipped.
    pub fn check_overlap(&self, query: &Sphere, ignore: &[ParticleId]) -> Vec<ParticleNeighbor> {
        self.pmat.check_overlap(query, ignore)
    }

    /// Open a transaction holding exclusive write access to this world.
    pub fn create_transaction(&mut self) -> Transaction<'_> {
        Transaction::new(self)
    }

    // ------------------------------------------------------------------
    // Structures.
    // ------------------------------------------------------------------

    /// Register a structure, assigning its id. The parent must already be
    /// registered.
    pub fn add_structure(&mut self, mut structure: Structure) -> Result<StructureId> {
        if !self.structures.contains_key(&structure.parent_id()) {
            return Err(GfrdError::not_found(format!(
                "parent structure {} of '{}' is not registered",
                structure.parent_id(),
                structure.name()
            )));
        }

        let id = StructureId(self.next_structure_id);
        self.next_structure_id += 1;
        structure.set_id(id)?;
        self.structures.insert(id, structure);
        Ok(id)
    }

    pub fn get_structure(&self, id: StructureId) -> Result<&Structure> {
        self.structures
            .get(&id)
            .ok_or_else(|| GfrdError::not_found(format!("no such structure: id={id}")))
    }

    pub fn get_structures(&self) -> impl Iterator<Item = &Structure> {
        self.structures.values()
    }

    /// Id of the root bulk region.
    pub fn default_structure_id(&self) -> StructureId {
        self.default_structure
    }

    /// The surface closest to `pos` under the minimum-image convention,
    /// together with its distance. The bulk root and `ignore` are skipped.
    pub fn get_closest_surface(
        &self,
        pos: DVec3,
        ignore: Option<StructureId>,
    ) -> Result<(StructureId, f64)> {
        let mut closest: Option<(StructureId, f64)> = None;

        for (id, structure) in &self.structures {
            if *id == self.default_structure || Some(*id) == ignore {
                continue;
            }
            let image = boundary::cyclic_transpose(pos, structure.position(), self.world_size());
            let dist = structure.distance(image);
            if closest.map_or(true, |(_, best)| dist < best) {
                closest = Some((*id, dist));
            }
        }

        closest.ok_or_else(|| GfrdError::not_found("no surface registered"))
    }
}
