use glam::DVec3;
use rand::Rng;
use std::f64::consts::TAU;

/// Unit vector along `v`, or zero when `v` has no length.
///
/// Unlike `DVec3::normalize` this never produces NaN components.
#[inline]
pub fn normalize_or_zero(v: DVec3) -> DVec3 {
    let len = v.length();
    if len > 0.0 && len.is_finite() {
        v / len
    } else {
        DVec3::ZERO
    }
}

/// True when every component is neither NaN nor infinite.
#[inline]
pub fn is_finite_vec(v: DVec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Direction sampled uniformly on the unit sphere.
///
/// Azimuth is uniform on [0, 2pi) and the polar angle comes from
/// `acos(u)` with `u` uniform on [-1, 1], which gives equal area density.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    let theta = rng.random_range(0.0..TAU);
    let phi = rng.random_range(-1.0..=1.0_f64).acos();

    DVec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}

/// Fraction of a run, in [0, 1], given elapsed and total time.
#[inline]
pub fn progress_fraction(t: f64, t_max: f64) -> f64 {
    if t_max <= 0.0 {
        1.0
    } else {
        (t / t_max).clamp(0.0, 1.0)
    }
}
