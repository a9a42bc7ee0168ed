//! Classical molecular dynamics of ions in a linear Paul trap.
//!
//! A [`solver::Simulation`] advances a fixed ensemble with velocity-Verlet
//! steps, combining trap confinement, Doppler cooling, Coulomb repulsion, a
//! secular drive and background gas collisions. The all-pairs Coulomb pass
//! runs on a worker pool before any ion moves.

pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod forces;
pub mod ion;
pub mod math;
pub mod snapshot;
pub mod solver;

pub use config::{LaserConfiguration, SimulationParameters, TrapConfiguration, TrapMode};
pub use error::{IonTrapError, Result};
pub use ion::{Ion, IonSet, IonSpecies};
pub use snapshot::{IonRecord, Snapshot};
pub use solver::{AbortReport, Axis, SimStatus, Simulation};
