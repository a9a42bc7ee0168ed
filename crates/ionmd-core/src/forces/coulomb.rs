use glam::DVec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::constants::OOFPEN;

/// Force exerted on ion `i` by ion `j`:
///
///   F = (1 / 4 pi eps0) Z_i Z_j (x_i - x_j) / |x_i - x_j|^3
///
/// Swapping the arguments yields exactly the negated vector. Coincident
/// positions produce NaN components.
#[inline]
pub fn pair_force(x_i: DVec3, z_i: f64, x_j: DVec3, z_j: f64) -> DVec3 {
    let r = x_i - x_j;
    let dist = r.length();
    r * (OOFPEN * (z_i * z_j) / (dist * dist * dist))
}

/// Net Coulomb force on ion `i` from every other ion, summed in index order.
pub fn net_force_on(i: usize, positions: &[DVec3], charges: &[f64]) -> DVec3 {
    let x_i = positions[i];
    let z_i = charges[i];
    let mut force = DVec3::ZERO;

    for (j, (&x_j, &z_j)) in positions.iter().zip(charges).enumerate() {
        if i == j {
            continue;
        }
        force += pair_force(x_i, z_i, x_j, z_j);
    }

    force
}

/// All-pairs Coulomb pass. Slot `i` of `out` receives the net force on ion `i`.
///
/// Ion state is only read, and each unit of work writes its own slot, so the
/// outer loop runs in parallel without locks. The per-slot sum order is fixed,
/// so results do not depend on the number of workers.
pub fn compute_coulomb_forces(positions: &[DVec3], charges: &[f64], out: &mut [DVec3]) {
    assert_eq!(positions.len(), charges.len(), "one charge per ion");
    assert_eq!(positions.len(), out.len(), "one buffer slot per ion");

    #[cfg(feature = "parallel")]
    {
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, slot)| *slot = net_force_on(i, positions, charges));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = net_force_on(i, positions, charges);
        }
    }
}

/// Step-scoped Coulomb force arena, reused across steps and indexed by ion
/// ordinal. Every slot is overwritten by `recompute` before it is read.
#[derive(Clone, Debug, Default)]
pub struct CoulombBuffer {
    forces: Vec<DVec3>,
}

impl CoulombBuffer {
    pub fn new(count: usize) -> Self {
        Self {
            forces: vec![DVec3::ZERO; count],
        }
    }

    /// Refill every slot from the current positions. Returns once all slots
    /// are written.
    pub fn recompute(&mut self, positions: &[DVec3], charges: &[f64]) {
        self.forces.resize(positions.len(), DVec3::ZERO);
        compute_coulomb_forces(positions, charges, &mut self.forces);
    }

    /// Zero every slot, used when the Coulomb interaction is disabled.
    pub fn clear(&mut self, count: usize) {
        self.forces.clear();
        self.forces.resize(count, DVec3::ZERO);
    }

    #[inline]
    pub fn get(&self, index: usize) -> DVec3 {
        self.forces[index]
    }

    pub fn as_slice(&self) -> &[DVec3] {
        &self.forces
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q_E;

    #[test]
    fn test_like_charges_repel() {
        let positions = vec![DVec3::new(-5.0e-6, 0.0, 0.0), DVec3::new(5.0e-6, 0.0, 0.0)];
        let charges = vec![Q_E, Q_E];
        let mut out = vec![DVec3::ZERO; 2];

        compute_coulomb_forces(&positions, &charges, &mut out);

        assert!(out[0].x < 0.0, "Like charges should repel: ion 0 should be pushed left");
        assert!(out[1].x > 0.0, "Like charges should repel: ion 1 should be pushed right");
    }

    #[test]
    fn test_unlike_charges_attract() {
        let positions = vec![DVec3::new(-5.0e-6, 0.0, 0.0), DVec3::new(5.0e-6, 0.0, 0.0)];
        let charges = vec![Q_E, -Q_E];
        let mut out = vec![DVec3::ZERO; 2];

        compute_coulomb_forces(&positions, &charges, &mut out);

        assert!(out[0].x > 0.0, "Unlike charges should attract: ion 0 should be pulled right");
        assert!(out[1].x < 0.0, "Unlike charges should attract: ion 1 should be pulled left");
    }

    #[test]
    fn test_inverse_square_magnitude() {
        let d = 10.0e-6;
        let f = pair_force(DVec3::ZERO, Q_E, DVec3::new(d, 0.0, 0.0), Q_E);
        let expected = OOFPEN * Q_E * Q_E / (d * d);
        assert!(
            ((f.length() - expected) / expected).abs() < 1e-12,
            "got {}, expected {}",
            f.length(),
            expected
        );
    }

    #[test]
    fn test_coincident_ions_are_not_finite() {
        let positions = vec![DVec3::ONE * 1.0e-6, DVec3::ONE * 1.0e-6];
        let charges = vec![Q_E, Q_E];
        let mut out = vec![DVec3::ZERO; 2];

        compute_coulomb_forces(&positions, &charges, &mut out);

        assert!(!out[0].is_finite(), "coincident ions must surface as NaN/Inf");
    }

    #[test]
    fn test_buffer_overwrites_every_slot() {
        let positions = vec![DVec3::ZERO, DVec3::new(1.0e-5, 0.0, 0.0), DVec3::new(0.0, 1.0e-5, 0.0)];
        let charges = vec![Q_E; 3];
        let mut buffer = CoulombBuffer::new(3);

        buffer.recompute(&positions, &charges);
        let first: Vec<DVec3> = buffer.as_slice().to_vec();
        buffer.recompute(&positions, &charges);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.as_slice(), first.as_slice(), "recompute must not accumulate");
        for i in 0..3 {
            assert_eq!(buffer.get(i), net_force_on(i, &positions, &charges));
        }
    }
}
