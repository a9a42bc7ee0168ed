//! Force models acting on a single ion, plus the all-pairs Coulomb pass.
//!
//! Every model except the collision kick is a pure function returning a
//! force in newtons. The kick changes velocity directly.

pub mod coulomb;
pub mod laser;
pub mod secular;
pub mod stochastic;
pub mod trap;

/// Which laser force policy the integrator applies.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ForceMode {
    /// Steady-state Doppler cooling of laser-coolable ions.
    Cooling,
    /// Settling toward equilibrium with an artificial damping coefficient
    /// (kg/s) applied to every ion.
    Settling { damping: f64 },
}
