//! Transactional particle mutation with rollback.
//!
//! A transaction owns write access to the world for its lifetime. Writes
//! take effect on the container immediately and are mirrored in the
//! transaction's bookkeeping: three disjoint id-sets (added, modified,
//! removed) and a pre-state snapshot for every modified or removed
//! particle. `rollback` restores the container to the pre-transaction
//! state; dropping the transaction without rolling back commits.

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec3;

use super::matrix_space::ParticleNeighbor;
use super::particle::{Particle, ParticleId, SpeciesId, SpeciesInfo};
use super::World;
use crate::error::{GfrdError, Result};
use crate::geometry::Sphere;
use crate::structure::{Structure, StructureId};

pub struct Transaction<'w> {
    world: &'w mut World,
    added: BTreeSet<ParticleId>,
    modified: BTreeSet<ParticleId>,
    removed: BTreeSet<ParticleId>,
    /// Pre-state for exactly the ids in `modified` and `removed`.
    orig: BTreeMap<ParticleId, Particle>,
}

impl<'w> Transaction<'w> {
    pub(crate) fn new(world: &'w mut World) -> Self {
        Self {
            world,
            added: BTreeSet::new(),
            modified: BTreeSet::new(),
            removed: BTreeSet::new(),
            orig: BTreeMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Recorded writes.
    // ------------------------------------------------------------------

    pub fn new_particle(&mut self, sid: SpeciesId, pos: DVec3) -> Result<(ParticleId, Particle)> {
        let pair = self.world.new_particle(sid, pos)?;
        // Re-adding a previously removed id cannot happen: the generator
        // never reuses ids.
        self.added.insert(pair.0);
        Ok(pair)
    }

    pub fn update_particle(&mut self, id: ParticleId, particle: Particle) -> Result<bool> {
        if self.removed.contains(&id) {
            return Err(GfrdError::illegal_state(format!(
                "update of particle removed in this transaction: id={id}"
            )));
        }
        if !self.added.contains(&id) && !self.orig.contains_key(&id) {
            let (_, prior) = self.world.get_particle(id)?;
            self.orig.insert(id, prior);
            self.modified.insert(id);
        }
        Ok(self.world.update_particle(id, particle))
    }

    pub fn remove_particle(&mut self, id: ParticleId) -> Result<bool> {
        if self.added.remove(&id) {
            // Created inside this transaction; it vanishes without trace.
            return Ok(self.world.remove_particle(id));
        }
        if !self.orig.contains_key(&id) {
            let (_, prior) = self.world.get_particle(id)?;
            self.orig.insert(id, prior);
        }
        self.modified.remove(&id);
        self.removed.insert(id);
        Ok(self.world.remove_particle(id))
    }

    // ------------------------------------------------------------------
    // Bookkeeping queries. All return snapshots, not live views.
    // ------------------------------------------------------------------

    pub fn get_added_particles(&self) -> Vec<(ParticleId, Particle)> {
        self.added
            .iter()
            .filter_map(|id| self.world.get_particle(*id).ok())
            .collect()
    }

    /// Removed particles in their pre-removal state.
    pub fn get_removed_particles(&self) -> Vec<(ParticleId, Particle)> {
        self.removed
            .iter()
            .filter_map(|id| self.orig.get(id).map(|particle| (*id, *particle)))
            .collect()
    }

    pub fn get_modified_particles(&self) -> Vec<(ParticleId, Particle)> {
        self.modified
            .iter()
            .filter_map(|id| self.world.get_particle(*id).ok())
            .collect()
    }

    /// Restore the container to its pre-transaction state and clear the
    /// bookkeeping. Idempotent; a second call is a no-op.
    pub fn rollback(&mut self) {
        // Pre-state first: re-inserts removed particles and rewinds
        // modified ones.
        for (id, particle) in std::mem::take(&mut self.orig) {
            self.world.update_particle(id, particle);
        }
        // Then drop everything this transaction created.
        for id in std::mem::take(&mut self.added) {
            self.world.remove_particle(id);
        }
        self.modified.clear();
        self.removed.clear();
    }

    // ------------------------------------------------------------------
    // Container surface, delegated.
    // ------------------------------------------------------------------

    pub fn num_particles(&self) -> usize {
        self.world.num_particles()
    }

    pub fn world_size(&self) -> f64 {
        self.world.world_size()
    }

    pub fn matrix_size(&self) -> usize {
        self.world.matrix_size()
    }

    pub fn cell_size(&self) -> f64 {
        self.world.cell_size()
    }

    pub fn distance(&self, lhs: DVec3, rhs: DVec3) -> f64 {
        self.world.distance(lhs, rhs)
    }

    pub fn apply_boundary(&self, pos: DVec3) -> DVec3 {
        self.world.apply_boundary(pos)
    }

    pub fn apply_boundary_coord(&self, v: f64) -> f64 {
        self.world.apply_boundary_coord(v)
    }

    pub fn cyclic_transpose(&self, p0: DVec3, p1: DVec3) -> DVec3 {
        self.world.cyclic_transpose(p0, p1)
    }

    pub fn cyclic_transpose_coord(&self, p0: f64, p1: f64) -> f64 {
        self.world.cyclic_transpose_coord(p0, p1)
    }

    pub fn check_overlap(&self, query: &Sphere, ignore: &[ParticleId]) -> Vec<ParticleNeighbor> {
        self.world.check_overlap(query, ignore)
    }

    pub fn get_particle(&self, id: ParticleId) -> Result<(ParticleId, Particle)> {
        self.world.get_particle(id)
    }

    pub fn has_particle(&self, id: ParticleId) -> bool {
        self.world.has_particle(id)
    }

    pub fn get_particles(&self) -> Vec<(ParticleId, Particle)> {
        self.world.get_particles()
    }

    pub fn get_species(&self, id: SpeciesId) -> Result<&SpeciesInfo> {
        self.world.get_species(id)
    }

    pub fn get_structure(&self, id: StructureId) -> Result<&Structure> {
        self.world.get_structure(id)
    }

    pub fn get_structures(&self) -> impl Iterator<Item = &Structure> {
        self.world.get_structures()
    }

    pub fn get_closest_surface(
        &self,
        pos: DVec3,
        ignore: Option<StructureId>,
    ) -> Result<(StructureId, f64)> {
        self.world.get_closest_surface(pos, ignore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::DEFAULT_STRUCTURE_TYPE;

    fn seeded_world() -> (World, ParticleId, ParticleId) {
        let mut world = World::new(10.0, 5);
        world.add_species(SpeciesInfo::new(
            SpeciesId(1),
            "A",
            0.1,
            1.0,
            DEFAULT_STRUCTURE_TYPE,
        ));
        let (p, _) = world.new_particle(SpeciesId(1), DVec3::splat(1.0)).unwrap();
        let (q, _) = world.new_particle(SpeciesId(1), DVec3::splat(2.0)).unwrap();
        (world, p, q)
    }

    #[test]
    fn test_bookkeeping_sets_are_disjoint() {
        let (mut world, p, q) = seeded_world();
        let mut tx = world.create_transaction();

        let (r, _) = tx.new_particle(SpeciesId(1), DVec3::splat(3.0)).unwrap();
        let (_, moved) = tx.get_particle(p).unwrap();
        tx.update_particle(p, moved.with_position(DVec3::splat(4.0)))
            .unwrap();
        tx.remove_particle(q).unwrap();

        let added: Vec<_> = tx.get_added_particles().iter().map(|(id, _)| *id).collect();
        let modified: Vec<_> = tx.get_modified_particles().iter().map(|(id, _)| *id).collect();
        let removed: Vec<_> = tx.get_removed_particles().iter().map(|(id, _)| *id).collect();

        assert_eq!(added, vec![r]);
        assert_eq!(modified, vec![p]);
        assert_eq!(removed, vec![q]);
    }

    #[test]
    fn test_update_then_remove_moves_to_removed_only() {
        let (mut world, p, _) = seeded_world();
        let mut tx = world.create_transaction();

        let (_, moved) = tx.get_particle(p).unwrap();
        tx.update_particle(p, moved.with_position(DVec3::splat(4.0)))
            .unwrap();
        tx.remove_particle(p).unwrap();

        assert!(tx.get_modified_particles().is_empty());
        let removed = tx.get_removed_particles();
        assert_eq!(removed.len(), 1);
        // Pre-state, not the intermediate update.
        assert!((removed[0].1.position() - DVec3::splat(1.0)).length() < 1e-12);
    }

    #[test]
    fn test_remove_added_leaves_no_trace() {
        let (mut world, _, _) = seeded_world();
        let before = world.get_particles();
        let mut tx = world.create_transaction();

        let (r, _) = tx.new_particle(SpeciesId(1), DVec3::splat(3.0)).unwrap();
        tx.remove_particle(r).unwrap();

        assert!(tx.get_added_particles().is_empty());
        assert!(tx.get_removed_particles().is_empty());
        assert_eq!(tx.get_particles(), before);
    }

    #[test]
    fn test_rollback_restores_container() {
        let (mut world, p, q) = seeded_world();
        let before = world.get_particles();
        let mut tx = world.create_transaction();

        tx.new_particle(SpeciesId(1), DVec3::splat(3.0)).unwrap();
        let (_, moved) = tx.get_particle(p).unwrap();
        tx.update_particle(p, moved.with_position(DVec3::splat(4.0)))
            .unwrap();
        tx.remove_particle(q).unwrap();

        tx.rollback();
        assert_eq!(tx.get_particles(), before);

        // Idempotent.
        tx.rollback();
        assert_eq!(tx.get_particles(), before);
    }

    #[test]
    fn test_update_after_remove_is_rejected() {
        let (mut world, p, _) = seeded_world();
        let mut tx = world.create_transaction();

        let (_, particle) = tx.get_particle(p).unwrap();
        tx.remove_particle(p).unwrap();
        assert!(matches!(
            tx.update_particle(p, particle),
            Err(GfrdError::IllegalState(_))
        ));
    }
}
