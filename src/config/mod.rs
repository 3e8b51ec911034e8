//! Configuration module for loading simulation parameters.
//!
//! Parameters carry citations to the conventions they encode; values load
//! from JSON with defaults as fallback.

mod parameters;

pub use parameters::{BdParameters, Parameters, WorldParameters};
