use glam::DVec3;

use crate::config::TrapConfiguration;

/// Secular excitation along x: `F_x = Z V_sec x cos(omega_sec t)`.
pub fn secular_force(position: DVec3, charge: f64, trap: &TrapConfiguration, t: f64) -> DVec3 {
    DVec3::new(
        charge * trap.v_sec * position.x * (trap.omega_sec * t).cos(),
        0.0,
        0.0,
    )
}
