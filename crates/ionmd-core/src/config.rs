use glam::DVec3;
use std::f64::consts::TAU;

use crate::error::{IonTrapError, Result};
use crate::math::{is_finite_vec, normalize_or_zero};

/// How the RF confinement is modeled.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TrapMode {
    /// Time-averaged harmonic pseudopotential.
    #[default]
    Pseudopotential,
    /// Explicit time-dependent RF field. No validated model exists yet, so
    /// the trap contributes no force in this mode.
    Micromotion,
}

/// Run-wide settings. Frozen while the simulation is running.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParameters {
    /// Timestep (s).
    pub dt: f64,
    /// Total simulated duration (s).
    pub t_max: f64,
    pub coulomb_enabled: bool,
    pub laser_enabled: bool,
    pub secular_enabled: bool,
    pub stochastic_enabled: bool,
    pub trap_mode: TrapMode,
    /// Stop the run when a transverse coordinate leaves `abort_distance`.
    pub abort_on_bounds: bool,
    /// Transverse abort threshold (m).
    pub abort_distance: f64,
    /// Background gas energy exchange rate used for collision kicks.
    pub collision_rate: f64,
    pub seed: u64,
    /// Coulomb worker threads; 0 uses the available hardware concurrency.
    pub num_threads: usize,
    /// Damping coefficient (kg/s) applied to every ion while settling.
    pub settle_damping: f64,
    /// Fraction of the run between progress log lines; 0 disables them.
    pub progress_interval: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            dt: 1.0e-9,
            t_max: 1.0e-4,
            coulomb_enabled: true,
            laser_enabled: true,
            secular_enabled: false,
            stochastic_enabled: false,
            trap_mode: TrapMode::Pseudopotential,
            abort_on_bounds: true,
            abort_distance: 1.0e-3,
            collision_rate: 0.0,
            seed: 0,
            num_threads: 0,
            settle_damping: 1.0e-20,
            progress_interval: 0.1,
        }
    }
}

impl SimulationParameters {
    /// Number of whole steps needed to reach `t_max`.
    ///
    /// A ratio within rounding noise of an integer is not bumped to the
    /// next step.
    pub fn total_steps(&self) -> u64 {
        let ratio = self.t_max / self.dt;
        if !ratio.is_finite() || ratio <= 0.0 {
            return 0;
        }
        let nearest = ratio.round();
        if (ratio - nearest).abs() <= 1.0e-9 * nearest.max(1.0) {
            nearest as u64
        } else {
            ratio.ceil() as u64
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(IonTrapError::InvalidParameter(format!(
                "dt must be positive and finite, got {}",
                self.dt
            )));
        }
        if !(self.t_max.is_finite() && self.t_max >= 0.0) {
            return Err(IonTrapError::InvalidParameter(format!(
                "t_max must be non-negative and finite, got {}",
                self.t_max
            )));
        }
        if self.abort_on_bounds && !(self.abort_distance > 0.0) {
            return Err(IonTrapError::InvalidParameter(format!(
                "abort_distance must be positive, got {}",
                self.abort_distance
            )));
        }
        if !(self.collision_rate.is_finite() && self.collision_rate >= 0.0) {
            return Err(IonTrapError::InvalidParameter(format!(
                "collision_rate must be non-negative, got {}",
                self.collision_rate
            )));
        }
        if !(self.settle_damping.is_finite() && self.settle_damping >= 0.0) {
            return Err(IonTrapError::InvalidParameter(format!(
                "settle_damping must be non-negative, got {}",
                self.settle_damping
            )));
        }
        if !(0.0..=1.0).contains(&self.progress_interval) {
            return Err(IonTrapError::InvalidParameter(format!(
                "progress_interval must lie in [0, 1], got {}",
                self.progress_interval
            )));
        }
        Ok(())
    }
}

/// Linear Paul trap geometry and drive.
#[derive(Clone, Debug, PartialEq)]
pub struct TrapConfiguration {
    /// RF drive amplitude (V).
    pub v_rf: f64,
    /// RF drive angular frequency (rad/s).
    pub omega_rf: f64,
    /// Radial electrode distance (m).
    pub r0: f64,
    /// Axial end-cap distance (m).
    pub z0: f64,
    /// Geometric factor for the end-cap field.
    pub kappa: f64,
    /// End-cap voltage (V).
    pub u_ec: f64,
    /// Secular drive amplitude (V/m^2).
    pub v_sec: f64,
    /// Secular drive angular frequency (rad/s).
    pub omega_sec: f64,
}

impl Default for TrapConfiguration {
    fn default() -> Self {
        Self {
            v_rf: 100.0,
            omega_rf: TAU * 3.0e6,
            r0: 3.0e-3,
            z0: 5.0e-3,
            kappa: 0.2,
            u_ec: 10.0,
            v_sec: 0.0,
            omega_sec: TAU * 100.0e3,
        }
    }
}

impl TrapConfiguration {
    /// Radial pseudopotential coefficient `A = Z V_rf^2 / (m Omega^2 r0^4)`.
    #[inline]
    pub fn radial_coefficient(&self, mass: f64, charge: f64) -> f64 {
        charge * self.v_rf.powi(2) / (mass * self.omega_rf.powi(2) * self.r0.powi(4))
    }

    /// Axial coefficient `B = kappa U_ec / (2 z0^2)`.
    #[inline]
    pub fn axial_coefficient(&self) -> f64 {
        self.kappa * self.u_ec / (2.0 * self.z0.powi(2))
    }

    /// Secular angular frequencies `(radial, axial)` of a single ion in the
    /// pseudopotential. A direction that is not confining reports zero.
    pub fn secular_frequencies(&self, mass: f64, charge: f64) -> (f64, f64) {
        let a = self.radial_coefficient(mass, charge);
        let b = self.axial_coefficient();
        let k_radial = 2.0 * charge * (a - b);
        let k_axial = 4.0 * charge * b;
        (
            (k_radial / mass).max(0.0).sqrt(),
            (k_axial / mass).max(0.0).sqrt(),
        )
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("v_rf", self.v_rf),
            ("omega_rf", self.omega_rf),
            ("r0", self.r0),
            ("z0", self.z0),
            ("kappa", self.kappa),
            ("u_ec", self.u_ec),
            ("v_sec", self.v_sec),
            ("omega_sec", self.omega_sec),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(IonTrapError::InvalidParameter(format!(
                "trap {name} is not finite: {value}"
            )));
        }
        for (name, value) in [("omega_rf", self.omega_rf), ("r0", self.r0), ("z0", self.z0)] {
            if value <= 0.0 {
                return Err(IonTrapError::InvalidParameter(format!(
                    "trap {name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// One Doppler cooling beam.
#[derive(Clone, Debug, PartialEq)]
pub struct LaserConfiguration {
    /// Wavelength (m).
    pub wavelength: f64,
    /// Propagation direction, always unit length.
    pub direction: DVec3,
    /// Saturation parameter s = I / I_sat.
    pub saturation: f64,
    /// Detuning from resonance (rad/s); negative is red.
    pub detuning: f64,
    /// Natural linewidth Gamma (rad/s).
    pub linewidth: f64,
    /// Pins the damping coefficient instead of deriving it per step.
    pub fixed_damping: Option<f64>,
}

impl LaserConfiguration {
    pub fn new(
        wavelength: f64,
        direction: DVec3,
        saturation: f64,
        detuning: f64,
        linewidth: f64,
    ) -> Self {
        Self {
            wavelength,
            direction: normalize_or_zero(direction),
            saturation,
            detuning,
            linewidth,
            fixed_damping: None,
        }
    }

    pub fn with_fixed_damping(mut self, beta: f64) -> Self {
        self.fixed_damping = Some(beta);
        self
    }

    /// Wave number k = 2 pi / lambda.
    #[inline]
    pub fn wave_number(&self) -> f64 {
        TAU / self.wavelength
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.wavelength.is_finite() && self.wavelength > 0.0) {
            return Err(IonTrapError::InvalidParameter(format!(
                "laser wavelength must be positive, got {}",
                self.wavelength
            )));
        }
        if !is_finite_vec(self.direction) || (self.direction.length_squared() - 1.0).abs() > 1e-9 {
            return Err(IonTrapError::InvalidParameter(format!(
                "laser direction must be a unit vector, got {}",
                self.direction
            )));
        }
        if !(self.linewidth.is_finite() && self.linewidth > 0.0) {
            return Err(IonTrapError::InvalidParameter(format!(
                "laser linewidth must be positive, got {}",
                self.linewidth
            )));
        }
        if !(self.saturation.is_finite() && self.saturation >= 0.0) || !self.detuning.is_finite() {
            return Err(IonTrapError::InvalidParameter(
                "laser saturation and detuning must be finite".to_string(),
            ));
        }
        if let Some(beta) = self.fixed_damping {
            if !beta.is_finite() {
                return Err(IonTrapError::InvalidParameter(format!(
                    "laser fixed damping is not finite: {beta}"
                )));
            }
        }
        Ok(())
    }
}
