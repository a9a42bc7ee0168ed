use glam::DVec3;

use crate::ion::IonSet;

/// One ion's kinematic state, laid out for zero-copy export: 72 bytes,
/// nine native-endian f64 values in position/velocity/acceleration
/// order.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct IonRecord {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub acceleration: [f64; 3],
}

impl IonRecord {
    pub fn position(&self) -> DVec3 {
        DVec3::from_array(self.position)
    }

    pub fn velocity(&self) -> DVec3 {
        DVec3::from_array(self.velocity)
    }

    pub fn acceleration(&self) -> DVec3 {
        DVec3::from_array(self.acceleration)
    }
}

/// Read-only copy of the ensemble after a step, handed to recorders.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Simulation time (s) of this state.
    pub time: f64,
    /// Completed steps.
    pub step: u64,
    pub ions: Vec<IonRecord>,
}

impl Snapshot {
    pub fn capture(ions: &IonSet, time: f64, step: u64) -> Self {
        let records = (0..ions.count)
            .map(|i| IonRecord {
                position: ions.position[i].to_array(),
                velocity: ions.velocity[i].to_array(),
                acceleration: ions.acceleration[i].to_array(),
            })
            .collect();
        Self {
            time,
            step,
            ions: records,
        }
    }

    pub fn len(&self) -> usize {
        self.ions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ions.is_empty()
    }

    /// Raw bytes of all records, for writers that dump binary frames.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.ions)
    }

    /// Positions flattened to `[x0, y0, z0, x1, ...]`.
    pub fn flat_positions(&self) -> Vec<f64> {
        self.ions.iter().flat_map(|r| r.position).collect()
    }
}
