//! gfrd-core - event-driven reaction-diffusion engine.
//!
//! This library is the core of an enhanced Green's Function Reaction
//! Dynamics (eGFRD) particle simulator: point particles undergo Brownian
//! motion on a periodic 3-D domain, constrained to geometric substrates
//! (bulk regions, planes, cylinders, disks, spheres), and react pairwise or
//! with surfaces. Instead of fixed time steps, protective domains are
//! erected around isolated particles or pairs and the domain's analytical
//! first-passage Green's function is sampled for the next event time, kind,
//! and exit configuration.
//!
//! The crate provides:
//! - shape primitives and structure substrates with cross-structure
//!   transition dispatch,
//! - a periodic spatial-hash particle container with transactional updates,
//! - the 1-D absorbing-sink-absorbing Green's function driving
//!   first-passage sampling.
//!
//! The event scheduler, reaction-rule database, and model loading live in
//! the layers above; this crate consumes a random source and exposes
//! particle updates, overlap queries, and first-passage samples.
//!
//! Reference: van Zon & ten Wolde, Phys Rev Lett 2005
//! Reference: Sokolowski et al., J Chem Phys 2019 (eGFRD in all dimensions)

// Allow non-snake-case so formulas can keep their textbook symbol names
// (Lr, Ll, L0, D...). This follows the project convention of naming
// quantities after the notation of the papers they come from.
#![allow(non_snake_case)]

pub mod config;
pub mod error;
pub mod geometry;
pub mod greens;
pub mod numerics;
pub mod physics;
pub mod structure;
pub mod world;

pub use config::Parameters;
pub use error::{GfrdError, Result};
pub use geometry::{Cuboid, Cylinder, Disk, Plane, Shape, Sphere};
pub use greens::{EventKind, GreensFunction1DAbsSinkAbs};
pub use structure::{Structure, StructureId, StructureKind, StructureTypeId};
pub use world::{Particle, ParticleId, SpeciesId, SpeciesInfo, Transaction, World};
