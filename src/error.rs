//! Error types for the reaction-diffusion core.
//!
//! Numerical edge cases (zero diffusivity, degenerate intervals, random
//! numbers at the extremes) are handled by deterministic fast paths in the
//! samplers and are *not* errors; everything here indicates a caller mistake
//! or a genuinely failed computation.

use thiserror::Error;

/// Unified error type for all core operations.
#[derive(Error, Debug)]
pub enum GfrdError {
    /// Out-of-range API input (random number outside [0,1], negative time,
    /// position outside the domain).
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// Query on an object in a state it should never be observed in;
    /// indicates a programmer bug in the calling layer.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// Lookup of an unknown particle or structure id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Pair reaction between particles more than one structure level apart.
    #[error("propagation error: {0}")]
    Propagation(String),

    /// Insertion failed because the target volume is occupied.
    #[error("no space: {0}")]
    NoSpace(String),

    /// Operation has no defined meaning for the given structure pair or
    /// surface type.
    #[error("unsupported operation: {0}")]
    NotSupported(String),

    /// A root finder or series evaluation failed beyond recovery.
    #[error("numerical error: {0}")]
    Numerical(String),
}

impl GfrdError {
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        GfrdError::IllegalArgument(message.into())
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        GfrdError::IllegalState(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        GfrdError::NotFound(message.into())
    }

    pub fn propagation(message: impl Into<String>) -> Self {
        GfrdError::Propagation(message.into())
    }

    pub fn no_space(message: impl Into<String>) -> Self {
        GfrdError::NoSpace(message.into())
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        GfrdError::NotSupported(message.into())
    }

    pub fn numerical(message: impl Into<String>) -> Self {
        GfrdError::Numerical(message.into())
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, GfrdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = GfrdError::illegal_argument("rnd out of range");
        assert!(matches!(err, GfrdError::IllegalArgument(_)));

        let err = GfrdError::propagation("structures two levels apart");
        assert!(matches!(err, GfrdError::Propagation(_)));
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = GfrdError::not_found("no such particle: id=42");
        assert!(err.to_string().contains("id=42"));
    }
}
