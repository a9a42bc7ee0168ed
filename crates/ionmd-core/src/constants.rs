//! Physical constants in SI units (CODATA 2018).

use std::f64::consts::PI;

/// Elementary charge (C).
pub const Q_E: f64 = 1.602_176_634e-19;

/// Atomic mass unit (kg).
pub const AMU: f64 = 1.660_539_066_60e-27;

/// Reduced Planck constant (J s).
pub const HBAR: f64 = 1.054_571_817e-34;

/// Boltzmann constant (J/K).
pub const K_B: f64 = 1.380_649e-23;

/// Vacuum permittivity (F/m).
pub const EPSILON_0: f64 = 8.854_187_812_8e-12;

/// Coulomb constant, 1 / (4 pi epsilon_0).
pub const OOFPEN: f64 = 1.0 / (4.0 * PI * EPSILON_0);
