//! Error types for the Σc environment layer.

use thiserror::Error;

/// Errors raised while assembling per-event data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataError {
    /// A mother or daughter index points outside the arena
    #[error("Particle {particle} references missing particle {target}")]
    DanglingReference { particle: usize, target: usize },

    /// A particle lists itself as its own mother or daughter
    #[error("Particle {0} references itself")]
    SelfReference(usize),
}

impl DataError {
    /// Creates a dangling-reference error.
    pub fn dangling(particle: usize, target: usize) -> Self {
        Self::DanglingReference { particle, target }
    }
}
