use glam::DVec3;

use crate::constants::{AMU, Q_E};
use crate::error::{IonTrapError, Result};
use crate::math::is_finite_vec;

/// Mass and charge assignment for one ion.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct IonSpecies {
    /// Mass (kg).
    pub mass: f64,
    /// Charge (C), a signed multiple of the elementary charge.
    pub charge: f64,
    /// Whether the Doppler beams address this ion.
    pub laser_coolable: bool,
}

impl IonSpecies {
    pub fn new(mass: f64, charge: f64, laser_coolable: bool) -> Self {
        Self {
            mass,
            charge,
            laser_coolable,
        }
    }

    /// Species from a mass in atomic mass units and a charge state in units
    /// of the elementary charge.
    pub fn from_amu(mass_amu: f64, charge_state: f64, laser_coolable: bool) -> Self {
        Self::new(mass_amu * AMU, charge_state * Q_E, laser_coolable)
    }
}

/// Copy of one ion's state, addressed by its ordinal in the ensemble.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Ion {
    pub index: usize,
    pub position: DVec3,
    pub velocity: DVec3,
    pub acceleration: DVec3,
    pub mass: f64,
    pub charge: f64,
    pub laser_coolable: bool,
}

/// SoA ion storage. Slot `i` of every vector belongs to ion `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct IonSet {
    pub count: usize,
    pub position: Vec<DVec3>,
    pub velocity: Vec<DVec3>,
    pub acceleration: Vec<DVec3>,
    pub mass: Vec<f64>,
    pub charge: Vec<f64>,
    pub laser_coolable: Vec<bool>,
}

impl IonSet {
    /// `count` singly charged 40 amu ions at rest at the origin.
    pub fn new(count: usize) -> Self {
        let species = IonSpecies::from_amu(40.0, 1.0, true);
        Self {
            count,
            position: vec![DVec3::ZERO; count],
            velocity: vec![DVec3::ZERO; count],
            acceleration: vec![DVec3::ZERO; count],
            mass: vec![species.mass; count],
            charge: vec![species.charge; count],
            laser_coolable: vec![species.laser_coolable; count],
        }
    }

    /// Build an ensemble from flat `[x0, y0, z0, x1, ...]` arrays and one
    /// species entry per ion. Accelerations start at zero.
    pub fn from_flat(positions: &[f64], velocities: &[f64], species: &[IonSpecies]) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(IonTrapError::MismatchedLength {
                name: "positions",
                expected: positions.len().next_multiple_of(3),
                actual: positions.len(),
            });
        }
        let count = positions.len() / 3;
        if velocities.len() != positions.len() {
            return Err(IonTrapError::MismatchedLength {
                name: "velocities",
                expected: positions.len(),
                actual: velocities.len(),
            });
        }
        if species.len() != count {
            return Err(IonTrapError::SpeciesCount {
                expected: count,
                actual: species.len(),
            });
        }

        let ions = Self {
            count,
            position: positions.chunks_exact(3).map(DVec3::from_slice).collect(),
            velocity: velocities.chunks_exact(3).map(DVec3::from_slice).collect(),
            acceleration: vec![DVec3::ZERO; count],
            mass: species.iter().map(|s| s.mass).collect(),
            charge: species.iter().map(|s| s.charge).collect(),
            laser_coolable: species.iter().map(|s| s.laser_coolable).collect(),
        };
        ions.validate()?;
        Ok(ions)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Every per-ion vector has `count` slots, every mass is positive and
    /// every charge, position, velocity and acceleration is finite.
    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("position", self.position.len()),
            ("velocity", self.velocity.len()),
            ("acceleration", self.acceleration.len()),
            ("mass", self.mass.len()),
            ("charge", self.charge.len()),
            ("laser_coolable", self.laser_coolable.len()),
        ];
        for (name, len) in lengths {
            if len != self.count {
                return Err(IonTrapError::MismatchedLength {
                    name,
                    expected: self.count,
                    actual: len,
                });
            }
        }
        for (index, &mass) in self.mass.iter().enumerate() {
            if !(mass.is_finite() && mass > 0.0) {
                return Err(IonTrapError::InvalidSpecies {
                    index,
                    reason: format!("mass must be positive, got {mass}"),
                });
            }
            if !self.charge[index].is_finite() {
                return Err(IonTrapError::InvalidSpecies {
                    index,
                    reason: format!("charge is not finite: {}", self.charge[index]),
                });
            }
            let finite = is_finite_vec(self.position[index])
                && is_finite_vec(self.velocity[index])
                && is_finite_vec(self.acceleration[index]);
            if !finite {
                return Err(IonTrapError::InvalidSpecies {
                    index,
                    reason: "position, velocity and acceleration must be finite".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn ion(&self, index: usize) -> Option<Ion> {
        (index < self.count).then(|| Ion {
            index,
            position: self.position[index],
            velocity: self.velocity[index],
            acceleration: self.acceleration[index],
            mass: self.mass[index],
            charge: self.charge[index],
            laser_coolable: self.laser_coolable[index],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Ion> + '_ {
        (0..self.count).filter_map(move |i| self.ion(i))
    }

    pub fn species(&self, index: usize) -> Option<IonSpecies> {
        (index < self.count).then(|| {
            IonSpecies::new(self.mass[index], self.charge[index], self.laser_coolable[index])
        })
    }
}
