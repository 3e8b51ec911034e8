//! MatrixSpace: a periodic uniform spatial hash over cubic cells.
//!
//! The world cube is partitioned into `matrix_size^3` cells of side
//! `cell_size = world_size / matrix_size`; every particle is stored in the
//! cell containing its wrapped center. Neighbor queries scan the 3x3x3
//! block of cells around the query center under periodic boundary
//! conditions. Callers keep `cell_size >= 2 * max particle radius`; the
//! container does not enforce it but the scan depth assumes it.

use std::collections::BTreeMap;

use glam::DVec3;

use super::boundary;
use super::particle::{Particle, ParticleId};
use crate::geometry::Sphere;

/// Pair of a particle entry and its signed edge distance to a query sphere.
pub type ParticleNeighbor = ((ParticleId, Particle), f64);

#[derive(Debug, Clone)]
pub struct MatrixSpace {
    world_size: f64,
    matrix_size: usize,
    cell_size: f64,
    /// Per-cell id lists in insertion order; the order is what makes
    /// overlap ties stable.
    cells: Vec<Vec<ParticleId>>,
    /// Id index; BTreeMap so enumeration is deterministic.
    index: BTreeMap<ParticleId, (Particle, usize)>,
}

impl MatrixSpace {
    pub fn new(world_size: f64, matrix_size: usize) -> Self {
        assert!(world_size > 0.0, "world_size must be positive");
        assert!(matrix_size >= 1, "matrix_size must be at least 1");
        Self {
            world_size,
            matrix_size,
            cell_size: world_size / matrix_size as f64,
            cells: vec![Vec::new(); matrix_size * matrix_size * matrix_size],
            index: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn world_size(&self) -> f64 {
        self.world_size
    }

    pub fn matrix_size(&self) -> usize {
        self.matrix_size
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_coord(&self, v: f64) -> usize {
        let wrapped = boundary::apply_boundary_coord(v, self.world_size);
        let i = (wrapped / self.cell_size) as usize;
        // A coordinate epsilon-close to world_size can land on matrix_size.
        i.min(self.matrix_size - 1)
    }

    fn cell_index(&self, pos: DVec3) -> usize {
        let (x, y, z) = (
            self.cell_coord(pos.x),
            self.cell_coord(pos.y),
            self.cell_coord(pos.z),
        );
        (x * self.matrix_size + y) * self.matrix_size + z
    }

    /// Insert or move a particle. Returns `true` when the id was new.
    pub fn update(&mut self, id: ParticleId, particle: Particle) -> bool {
        let cell = self.cell_index(particle.position());

        match self.index.insert(id, (particle, cell)) {
            None => {
                self.cells[cell].push(id);
                true
            }
            Some((_, old_cell)) => {
                if old_cell != cell {
                    self.cells[old_cell].retain(|other| *other != id);
                    self.cells[cell].push(id);
                }
                false
            }
        }
    }

    /// Remove a particle. Returns `false` for an unknown id.
    pub fn erase(&mut self, id: ParticleId) -> bool {
        match self.index.remove(&id) {
            None => false,
            Some((_, cell)) => {
                self.cells[cell].retain(|other| *other != id);
                true
            }
        }
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.index.get(&id).map(|(particle, _)| particle)
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.index.contains_key(&id)
    }

    /// Enumerate all particles in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ParticleId, &Particle)> {
        self.index.iter().map(|(id, (particle, _))| (*id, particle))
    }

    /// All particles overlapping the query sphere, sorted ascending by
    /// signed edge distance (`center distance - radii sum`, negative means
    /// overlap), ties stable in scan order. Ids in `ignore` are skipped.
    pub fn check_overlap(&self, query: &Sphere, ignore: &[ParticleId]) -> Vec<ParticleNeighbor> {
        let center = boundary::apply_boundary(query.position, self.world_size);
        let n = self.matrix_size as isize;

        let base = (
            self.cell_coord(center.x) as isize,
            self.cell_coord(center.y) as isize,
            self.cell_coord(center.z) as isize,
        );

        let mut visited = Vec::with_capacity(27);
        let mut result: Vec<ParticleNeighbor> = Vec::new();

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let x = (base.0 + dx).rem_euclid(n) as usize;
                    let y = (base.1 + dy).rem_euclid(n) as usize;
                    let z = (base.2 + dz).rem_euclid(n) as usize;
                    let cell = (x * self.matrix_size + y) * self.matrix_size + z;

                    // Small matrices alias neighbors onto the same cell.
                    if visited.contains(&cell) {
                        continue;
                    }
                    visited.push(cell);

                    for id in &self.cells[cell] {
                        if ignore.contains(id) {
                            continue;
                        }
                        let (particle, _) = &self.index[id];
                        let dist = boundary::distance(
                            particle.position(),
                            center,
                            self.world_size,
                        ) - particle.radius()
                            - query.radius;
                        if dist <= 0.0 {
                            result.push(((*id, *particle), dist));
                        }
                    }
                }
            }
        }

        // Stable sort keeps scan order on ties.
        result.sort_by(|a, b| a.1.total_cmp(&b.1));
        result
    }
}
