//! Analytical Green's functions for first-passage sampling.
//!
//! A protective domain erected around a particle (or pair) turns its next
//! event into a first-passage problem with an exact solution: the Green's
//! function of the diffusion equation under the domain's boundary
//! conditions. Sampling that solution yields the event time, the event kind
//! (escape through a boundary or reaction at the sink), and the exit
//! configuration.
//!
//! This module carries the one-dimensional absorbing-sink-absorbing
//! function used for pairs on rod-like substrates. Instances are transient:
//! one per event, discarded after sampling. The root cache lives inside the
//! instance and is never shared.
//!
//! Reference: van Zon & ten Wolde, J Chem Phys 2005
//! Reference: Sokolowski et al., J Chem Phys 2019

mod abs_sink_abs;

pub use abs_sink_abs::GreensFunction1DAbsSinkAbs;

/// Series and bracketing tolerance shared by the Green's function solvers.
pub const EPSILON: f64 = 1e-10;

/// Hard cap on the number of eigenmodes summed per evaluation.
pub const MAX_TERMS: usize = 500;

/// Kind of first-passage event drawn from a Green's function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The particle left the protective domain through an absorbing
    /// boundary.
    Escape,
    /// The pair reacted at the sink.
    Reaction,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Escape => f.write_str("ESCAPE"),
            EventKind::Reaction => f.write_str("REACTION"),
        }
    }
}
