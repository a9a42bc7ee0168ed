use glam::DVec3;

use super::ForceMode;
use crate::config::LaserConfiguration;
use crate::constants::HBAR;

/// Doppler-shifted detuning `delta + k (k_hat . v)` seen by a moving ion.
#[inline]
pub fn effective_detuning(velocity: DVec3, beam: &LaserConfiguration) -> f64 {
    beam.detuning + beam.wave_number() * beam.direction.dot(velocity)
}

/// Radiation pressure magnitude `F0 = (hbar k Gamma / 2) s0 / (s0 + 1)` with
/// `s0 = s (1 + (2 delta_eff / Gamma)^2)`.
pub fn scattering_force(velocity: DVec3, beam: &LaserConfiguration) -> f64 {
    let k = beam.wave_number();
    let gamma = beam.linewidth;
    let x = 2.0 * effective_detuning(velocity, beam) / gamma;
    let s0 = beam.saturation * (1.0 + x * x);
    (HBAR * k * gamma / 2.0) * (s0 / (s0 + 1.0))
}

/// Velocity damping coefficient beta (kg/s) from the slope of the
/// scattering force with respect to velocity:
///
///   beta = -8 hbar k^2 delta_eff s / (Gamma (1 + s + (2 delta_eff / Gamma)^2)^2)
///
/// Positive for red detuning. A beam with `fixed_damping` returns that
/// value instead.
pub fn damping_coefficient(velocity: DVec3, beam: &LaserConfiguration) -> f64 {
    if let Some(beta) = beam.fixed_damping {
        return beta;
    }
    let k = beam.wave_number();
    let gamma = beam.linewidth;
    let s = beam.saturation;
    let delta = effective_detuning(velocity, beam);
    let x = 2.0 * delta / gamma;
    let denom = 1.0 + s + x * x;
    -8.0 * HBAR * k * k * delta * s / (gamma * denom * denom)
}

/// Contribution of one beam: `F0 k_hat - beta v`.
pub fn beam_force(velocity: DVec3, beam: &LaserConfiguration) -> DVec3 {
    beam.direction * scattering_force(velocity, beam) - velocity * damping_coefficient(velocity, beam)
}

/// Net laser force on one ion over all beams.
///
/// While cooling, only laser-coolable ions feel the beams. While settling,
/// every ion is damped once with the settling coefficient and only coolable
/// ions keep the radiation pressure term.
pub fn laser_force(
    velocity: DVec3,
    laser_coolable: bool,
    beams: &[LaserConfiguration],
    mode: ForceMode,
) -> DVec3 {
    match mode {
        ForceMode::Cooling => {
            if !laser_coolable {
                return DVec3::ZERO;
            }
            beams
                .iter()
                .fold(DVec3::ZERO, |acc, beam| acc + beam_force(velocity, beam))
        }
        ForceMode::Settling { damping } => {
            let pressure = if laser_coolable {
                beams.iter().fold(DVec3::ZERO, |acc, beam| {
                    acc + beam.direction * scattering_force(velocity, beam)
                })
            } else {
                DVec3::ZERO
            };
            pressure - velocity * damping
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn red_beam() -> LaserConfiguration {
        let gamma = TAU * 22.0e6;
        LaserConfiguration::new(397.0e-9, DVec3::X, 1.0, -gamma / 2.0, gamma)
    }

    #[test]
    fn test_pushes_along_beam_at_rest() {
        let f = beam_force(DVec3::ZERO, &red_beam());
        assert!(f.x > 0.0, "radiation pressure should point along k: {:?}", f);
        assert!(f.y.abs() < 1e-40 && f.z.abs() < 1e-40);
    }

    #[test]
    fn test_red_detuning_damps_motion() {
        let beam = red_beam();
        assert!(damping_coefficient(DVec3::ZERO, &beam) > 0.0);

        let v = DVec3::new(1.0, 0.0, 0.0);
        let at_rest = beam_force(DVec3::ZERO, &beam).x;
        let with_beam = beam_force(v, &beam).x;
        let against_beam = beam_force(-v, &beam).x;
        assert!(with_beam < at_rest, "moving with the beam should reduce the push");
        assert!(against_beam > at_rest, "moving into the beam should increase the push");
    }

    #[test]
    fn test_fixed_damping_overrides() {
        let beam = red_beam().with_fixed_damping(2.0e-22);
        assert_eq!(damping_coefficient(DVec3::new(3.0, 0.0, 0.0), &beam), 2.0e-22);
    }

    #[test]
    fn test_non_coolable_ignored_while_cooling() {
        let beams = vec![red_beam()];
        let f = laser_force(DVec3::new(1.0, 2.0, 3.0), false, &beams, ForceMode::Cooling);
        assert_eq!(f, DVec3::ZERO);
    }

    #[test]
    fn test_settling_damps_non_coolable_without_pressure() {
        let beams = vec![red_beam(), red_beam()];
        let v = DVec3::new(1.0, -2.0, 0.5);
        let f = laser_force(v, false, &beams, ForceMode::Settling { damping: 1.0e-20 });
        assert_eq!(f, -v * 1.0e-20);
    }

    #[test]
    fn test_settling_keeps_pressure_for_coolable() {
        let beams = vec![red_beam()];
        let f = laser_force(DVec3::ZERO, true, &beams, ForceMode::Settling { damping: 1.0e-20 });
        assert!(f.x > 0.0, "coolable ions keep radiation pressure while settling");
    }

    #[test]
    fn test_beams_sum() {
        let a = red_beam();
        let b = LaserConfiguration::new(397.0e-9, -DVec3::X, a.saturation, a.detuning, a.linewidth);
        let f = laser_force(DVec3::ZERO, true, &[a, b], ForceMode::Cooling);
        assert!(f.length() < 1e-30, "counter-propagating beams should cancel at rest: {:?}", f);
    }
}
