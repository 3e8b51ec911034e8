//! Particles and the species registry.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::geometry::Sphere;
use crate::structure::StructureTypeId;

/// Identifier of a particle instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID({})", self.0)
    }
}

/// Identifier of a particle species.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SpeciesId(pub u64);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpID({})", self.0)
    }
}

/// Static per-species data resolved when particles are created.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesInfo {
    pub id: SpeciesId,
    pub name: String,
    /// Particle radius.
    pub radius: f64,
    /// Diffusion coefficient.
    pub diffusion: f64,
    /// Structure type this species lives on.
    pub structure_type: StructureTypeId,
}

impl SpeciesInfo {
    pub fn new(
        id: SpeciesId,
        name: impl Into<String>,
        radius: f64,
        diffusion: f64,
        structure_type: StructureTypeId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            radius,
            diffusion,
            structure_type,
        }
    }
}

/// A point particle: a sphere carrying species identity and a diffusion
/// coefficient.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub species_id: SpeciesId,
    pub shape: Sphere,
    pub diffusion: f64,
}

impl Particle {
    pub fn new(species_id: SpeciesId, shape: Sphere, diffusion: f64) -> Self {
        Self {
            species_id,
            shape,
            diffusion,
        }
    }

    pub fn position(&self) -> DVec3 {
        self.shape.position
    }

    pub fn radius(&self) -> f64 {
        self.shape.radius
    }

    /// The particle moved; same body, new center.
    pub fn with_position(mut self, position: DVec3) -> Self {
        self.shape.position = position;
        self
    }
}

/// Equality is by species and shape; the diffusion coefficient is species
/// data and does not participate.
impl PartialEq for Particle {
    fn eq(&self, other: &Self) -> bool {
        self.species_id == other.species_id && self.shape == other.shape
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Particle({}, D={}, {})",
            self.shape, self.diffusion, self.species_id
        )
    }
}
