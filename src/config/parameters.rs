//! Parameter structures for world sizing and Brownian-dynamics stepping.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level parameters container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameters {
    /// World sizing (domain edge, spatial hash resolution)
    pub world: WorldParameters,
    /// Brownian-dynamics fallback stepping
    pub bd: BdParameters,
}

impl Parameters {
    /// Load parameters from JSON files, or use defaults if files don't
    /// exist
    pub fn load_or_default() -> Self {
        let world = WorldParameters::load_or_default("data/parameters/world.json");
        let bd = BdParameters::load_or_default("data/parameters/bd.json");

        Self { world, bd }
    }

    /// Load parameters from a specific directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let world = WorldParameters::load_or_default(dir.join("world.json"));
        let bd = BdParameters::load_or_default(dir.join("bd.json"));

        Self { world, bd }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            world: WorldParameters::default(),
            bd: BdParameters::default(),
        }
    }
}

/// World sizing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldParameters {
    /// Edge length of the cubic domain (m)
    pub world_size: f64,

    /// Cells per edge of the spatial hash.
    /// The matrix size bounds protective domain radii: domains must fit in
    /// a cell neighborhood. More particles want more cells; fewer
    /// particles want larger cells so domains can grow.
    pub matrix_size: usize,
}

impl WorldParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(params) => {
                    log::info!("Loaded world parameters from {:?}", path.as_ref());
                    params
                }
                Err(e) => {
                    log::warn!("Failed to parse world parameters: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("World parameters file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Cell edge length.
    pub fn cell_size(&self) -> f64 {
        self.world_size / self.matrix_size as f64
    }
}

impl Default for WorldParameters {
    fn default() -> Self {
        Self {
            // 1 femtoliter cube, a typical E. coli-scale compartment
            world_size: 1e-6,

            // Conventional default for mid-size models
            matrix_size: 10,
        }
    }
}

/// Stepping parameters for the Brownian-dynamics fallback propagator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BdParameters {
    /// Timestep as a fraction of the contact diffusion time
    /// sigma^2 / D of the smallest species pair.
    pub dt_factor: f64,

    /// Reaction zone thickness as a fraction of the contact distance.
    /// Reference: Morelli & ten Wolde, J Chem Phys 2008
    pub reaction_length_factor: f64,
}

impl BdParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(params) => {
                    log::info!("Loaded BD parameters from {:?}", path.as_ref());
                    params
                }
                Err(e) => {
                    log::warn!("Failed to parse BD parameters: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("BD parameters file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Timestep for the given contact distance and diffusion constant.
    pub fn dt(&self, sigma: f64, d: f64) -> f64 {
        self.dt_factor * sigma * sigma / d
    }

    /// Reaction length for the given contact distance.
    pub fn reaction_length(&self, sigma: f64) -> f64 {
        self.reaction_length_factor * sigma
    }
}

impl Default for BdParameters {
    fn default() -> Self {
        Self {
            // Small enough that single-step displacement stays well under
            // the particle size
            dt_factor: 1e-5,

            // Morelli & ten Wolde 2008
            reaction_length_factor: 0.05,
        }
    }
}
