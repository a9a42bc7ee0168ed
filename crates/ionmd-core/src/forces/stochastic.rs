use glam::DVec3;
use rand::Rng;

use crate::constants::K_B;
use crate::math::random_unit_vector;

/// Speed of one background gas collision kick, `sqrt(2 k_B gamma_col dt / m)`.
#[inline]
pub fn kick_speed(mass: f64, collision_rate: f64, dt: f64) -> f64 {
    (2.0 * K_B * collision_rate * dt / mass).sqrt()
}

/// Velocity change from one collision, in a direction drawn uniformly on the
/// unit sphere. Draws exactly two values from `rng`.
pub fn collision_kick<R: Rng + ?Sized>(mass: f64, collision_rate: f64, dt: f64, rng: &mut R) -> DVec3 {
    random_unit_vector(rng) * kick_speed(mass, collision_rate, dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AMU;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_kick_has_expected_speed() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let m = 40.0 * AMU;
        let expected = kick_speed(m, 1.0, 1.0e-9);
        for _ in 0..100 {
            let kick = collision_kick(m, 1.0, 1.0e-9, &mut rng);
            assert!(
                ((kick.length() - expected) / expected).abs() < 1e-9,
                "kick speed {} != {}",
                kick.length(),
                expected
            );
        }
    }

    #[test]
    fn test_same_seed_same_kicks() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(
                collision_kick(AMU, 1.0, 1.0, &mut a),
                collision_kick(AMU, 1.0, 1.0, &mut b)
            );
        }
    }

    #[test]
    fn test_zero_rate_no_kick() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(collision_kick(AMU, 0.0, 1.0e-9, &mut rng).length(), 0.0);
    }

    #[test]
    fn test_directions_cover_sphere() {
        let mut rng = ChaCha8Rng::seed_from_u64(12345);
        let n = 20_000;
        let mean = (0..n).fold(DVec3::ZERO, |acc, _| acc + random_unit_vector(&mut rng)) / n as f64;
        assert!(mean.length() < 0.03, "directions should average to zero: {:?}", mean);
    }
}
