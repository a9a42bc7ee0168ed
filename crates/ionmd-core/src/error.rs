//! Error types for ionmd-core.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IonTrapError {
    #[error("{name} has {actual} values, expected {expected} (3 per ion)")]
    MismatchedLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("species list has {actual} entries for {expected} ions")]
    SpeciesCount { expected: usize, actual: usize },

    #[error("invalid species for ion {index}: {reason}")]
    InvalidSpecies { index: usize, reason: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("cannot reconfigure {0} while the simulation is running")]
    Running(&'static str),

    #[error("simulation is not idle (status: {0})")]
    NotIdle(String),

    #[error("failed to build Coulomb worker pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, IonTrapError>;
