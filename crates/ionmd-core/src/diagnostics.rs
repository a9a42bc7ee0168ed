use glam::DVec3;

use crate::ion::IonSet;

/// Sum of `m v` over the ensemble.
pub fn total_momentum(ions: &IonSet) -> DVec3 {
    ions.velocity
        .iter()
        .zip(&ions.mass)
        .fold(DVec3::ZERO, |acc, (&v, &m)| acc + v * m)
}

/// Sum of `m v^2 / 2` over the ensemble (J).
pub fn kinetic_energy(ions: &IonSet) -> f64 {
    ions.velocity
        .iter()
        .zip(&ions.mass)
        .map(|(v, m)| 0.5 * m * v.length_squared())
        .sum()
}

/// Root-mean-square speed of the ensemble; zero when empty.
pub fn rms_speed(ions: &IonSet) -> f64 {
    if ions.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = ions.velocity.iter().map(|v| v.length_squared()).sum();
    (sum_sq / ions.count as f64).sqrt()
}

/// Windowed RMS speed, the usual proxy for ensemble temperature.
///
/// Feed one sample per step. Every `window` samples it emits the RMS speed
/// averaged over the window and starts over.
pub struct SpeedWindow {
    /// Steps per emitted value.
    pub window: u32,
    sum_sq: f64,
    ion_samples: u64,
    steps: u32,
    last: Option<f64>,
}

impl SpeedWindow {
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            sum_sq: 0.0,
            ion_samples: 0,
            steps: 0,
            last: None,
        }
    }

    /// Accumulate the current ensemble. Returns the window average when
    /// this sample completes a window.
    pub fn record(&mut self, ions: &IonSet) -> Option<f64> {
        self.sum_sq += ions.velocity.iter().map(|v| v.length_squared()).sum::<f64>();
        self.ion_samples += ions.count as u64;
        self.steps += 1;

        if self.steps < self.window {
            return None;
        }

        let value = if self.ion_samples == 0 {
            0.0
        } else {
            (self.sum_sq / self.ion_samples as f64).sqrt()
        };
        self.sum_sq = 0.0;
        self.ion_samples = 0;
        self.steps = 0;
        self.last = Some(value);
        Some(value)
    }

    /// Most recently completed window average.
    pub fn last(&self) -> Option<f64> {
        self.last
    }
}
