use glam::DVec3;

use crate::config::{TrapConfiguration, TrapMode};

/// Confinement force on one ion.
///
/// In pseudopotential mode the RF field is replaced by its time average:
///
///   A = Z V_rf^2 / (m Omega_rf^2 r0^4),   B = kappa U_ec / (2 z0^2)
///   F = (-2Z(A - B) x, -2Z(A - B) y, -4ZB z)
///
/// which is a harmonic well centred on the trap axis. Micromotion mode has
/// no validated field model and contributes nothing.
pub fn trap_force(
    position: DVec3,
    mass: f64,
    charge: f64,
    trap: &TrapConfiguration,
    mode: TrapMode,
) -> DVec3 {
    match mode {
        TrapMode::Pseudopotential => {
            let a = trap.radial_coefficient(mass, charge);
            let b = trap.axial_coefficient();
            let radial = -2.0 * charge * (a - b);
            DVec3::new(
                radial * position.x,
                radial * position.y,
                -4.0 * charge * b * position.z,
            )
        }
        TrapMode::Micromotion => DVec3::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AMU, Q_E};

    #[test]
    fn test_restoring_toward_center() {
        let trap = TrapConfiguration::default();
        let pos = DVec3::new(1.0e-6, -2.0e-6, 3.0e-6);
        let f = trap_force(pos, 40.0 * AMU, Q_E, &trap, TrapMode::Pseudopotential);

        assert!(f.x < 0.0, "x force should point inward: {:?}", f);
        assert!(f.y > 0.0, "y force should point inward: {:?}", f);
        assert!(f.z < 0.0, "z force should point inward: {:?}", f);
    }

    #[test]
    fn test_zero_at_center() {
        let trap = TrapConfiguration::default();
        let f = trap_force(DVec3::ZERO, 40.0 * AMU, Q_E, &trap, TrapMode::Pseudopotential);
        assert_eq!(f, DVec3::ZERO);
    }

    #[test]
    fn test_linear_in_displacement() {
        let trap = TrapConfiguration::default();
        let m = 40.0 * AMU;
        let f1 = trap_force(DVec3::new(1.0e-6, 0.0, 0.0), m, Q_E, &trap, TrapMode::Pseudopotential);
        let f2 = trap_force(DVec3::new(2.0e-6, 0.0, 0.0), m, Q_E, &trap, TrapMode::Pseudopotential);
        assert!((f2.x / f1.x - 2.0).abs() < 1e-12, "harmonic force should scale linearly");
    }

    #[test]
    fn test_micromotion_contributes_nothing() {
        let trap = TrapConfiguration::default();
        let pos = DVec3::new(1.0e-6, 1.0e-6, 1.0e-6);
        let f = trap_force(pos, 40.0 * AMU, Q_E, &trap, TrapMode::Micromotion);
        assert_eq!(f, DVec3::ZERO);
    }
}
