use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;

use crate::config::{LaserConfiguration, SimulationParameters, TrapConfiguration, TrapMode};
use crate::error::{IonTrapError, Result};
use crate::forces::coulomb::CoulombBuffer;
use crate::forces::laser::laser_force;
use crate::forces::secular::secular_force;
use crate::forces::stochastic::collision_kick;
use crate::forces::trap::trap_force;
use crate::forces::ForceMode;
use crate::ion::{Ion, IonSet, IonSpecies};
use crate::math::progress_fraction;
use crate::snapshot::Snapshot;

/// Transverse axis named in an abort report.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Where and why a run was stopped by the bounds check.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct AbortReport {
    /// Ordinal of the offending ion.
    pub ion: usize,
    pub axis: Axis,
    /// Offending coordinate value (m); may be NaN or infinite.
    pub value: f64,
    /// Zero-based index of the step that failed.
    pub step: u64,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SimStatus {
    Idle,
    Running,
    Finished,
    Aborted(AbortReport),
}

impl SimStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SimStatus::Finished | SimStatus::Aborted(_))
    }
}

impl fmt::Display for SimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimStatus::Idle => write!(f, "idle"),
            SimStatus::Running => write!(f, "running"),
            SimStatus::Finished => write!(f, "finished"),
            SimStatus::Aborted(r) => {
                write!(f, "aborted (ion {} {} = {:.3e})", r.ion, r.axis, r.value)
            }
        }
    }
}

/// Fixed-timestep velocity-Verlet simulation of a trapped ion ensemble.
///
/// Lifecycle: `Idle -> Running -> {Finished | Aborted}`. Configuration can
/// only change while idle.
pub struct Simulation {
    params: SimulationParameters,
    trap: TrapConfiguration,
    lasers: Vec<LaserConfiguration>,
    ions: IonSet,
    /// Velocities restored after settling.
    initial_velocity: Vec<DVec3>,
    coulomb: CoulombBuffer,
    rng: ChaCha8Rng,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
    status: SimStatus,
    steps: u64,
    total_steps: u64,
    next_progress: u64,
}

impl Simulation {
    /// Build a simulation from flat `[x0, y0, z0, x1, ...]` position and
    /// velocity arrays and one species entry per ion.
    pub fn new(
        positions: &[f64],
        velocities: &[f64],
        species: &[IonSpecies],
        params: SimulationParameters,
        trap: TrapConfiguration,
        lasers: Vec<LaserConfiguration>,
    ) -> Result<Self> {
        let ions = IonSet::from_flat(positions, velocities, species)?;
        Self::from_ions(ions, params, trap, lasers)
    }

    pub fn from_ions(
        ions: IonSet,
        params: SimulationParameters,
        trap: TrapConfiguration,
        lasers: Vec<LaserConfiguration>,
    ) -> Result<Self> {
        ions.validate()?;
        params.validate()?;
        trap.validate()?;
        for laser in &lasers {
            laser.validate()?;
        }
        warn_placeholder_modes(&params);

        #[cfg(feature = "parallel")]
        let pool = build_pool(params.num_threads)?;

        let count = ions.count;
        let total_steps = params.total_steps();
        let sim = Self {
            rng: ChaCha8Rng::seed_from_u64(params.seed),
            initial_velocity: ions.velocity.clone(),
            coulomb: CoulombBuffer::new(count),
            params,
            trap,
            lasers,
            ions,
            #[cfg(feature = "parallel")]
            pool,
            status: SimStatus::Idle,
            steps: 0,
            total_steps,
            next_progress: 0,
        };
        log::debug!(
            "simulation configured: {} ions, {} steps, {} Coulomb workers",
            count,
            total_steps,
            sim.worker_threads()
        );
        Ok(sim)
    }

    // ---------- read-only accessors ----------

    pub fn status(&self) -> SimStatus {
        self.status
    }

    pub fn abort_report(&self) -> Option<AbortReport> {
        match self.status {
            SimStatus::Aborted(report) => Some(report),
            _ => None,
        }
    }

    /// Simulation time (s) of the current state.
    pub fn time(&self) -> f64 {
        self.steps as f64 * self.params.dt
    }

    /// Completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn ions(&self) -> &IonSet {
        &self.ions
    }

    pub fn ion(&self, index: usize) -> Option<Ion> {
        self.ions.ion(index)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.ions, self.time(), self.steps)
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn trap(&self) -> &TrapConfiguration {
        &self.trap
    }

    pub fn lasers(&self) -> &[LaserConfiguration] {
        &self.lasers
    }

    /// Coulomb forces used by the most recent step.
    pub fn coulomb_forces(&self) -> &[DVec3] {
        self.coulomb.as_slice()
    }

    pub fn worker_threads(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            self.pool.current_num_threads()
        }

        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    }

    // ---------- reconfiguration (idle only) ----------

    pub fn set_params(&mut self, params: SimulationParameters) -> Result<()> {
        self.ensure_idle("parameters")?;
        params.validate()?;
        warn_placeholder_modes(&params);

        #[cfg(feature = "parallel")]
        {
            if params.num_threads != self.params.num_threads {
                self.pool = build_pool(params.num_threads)?;
            }
        }

        self.rng = ChaCha8Rng::seed_from_u64(params.seed);
        self.total_steps = params.total_steps();
        self.params = params;
        Ok(())
    }

    pub fn set_trap(&mut self, trap: TrapConfiguration) -> Result<()> {
        self.ensure_idle("trap")?;
        trap.validate()?;
        self.trap = trap;
        Ok(())
    }

    pub fn set_lasers(&mut self, lasers: Vec<LaserConfiguration>) -> Result<()> {
        self.ensure_idle("lasers")?;
        for laser in &lasers {
            laser.validate()?;
        }
        self.lasers = lasers;
        Ok(())
    }

    pub fn set_ions(&mut self, ions: IonSet) -> Result<()> {
        self.ensure_idle("ions")?;
        ions.validate()?;
        self.initial_velocity = ions.velocity.clone();
        self.coulomb.clear(ions.count);
        self.ions = ions;
        Ok(())
    }

    fn ensure_idle(&self, what: &'static str) -> Result<()> {
        match self.status {
            SimStatus::Idle => Ok(()),
            SimStatus::Running => {
                log::warn!("Can't change {} while the simulation is running", what);
                Err(IonTrapError::Running(what))
            }
            status => {
                log::warn!("Can't change {} on a {} simulation", what, status);
                Err(IonTrapError::NotIdle(status.to_string()))
            }
        }
    }

    // ---------- control ----------

    /// Relax the ensemble toward equilibrium before a run.
    ///
    /// Runs `steps` steps with trap and Coulomb forces plus an artificial
    /// damping on every ion (radiation pressure only on coolable ions). The
    /// secular drive and collision kicks are off. Afterwards the initial
    /// velocities are restored, accelerations are cleared and the clock
    /// stays at zero. Returns `Aborted` if the bounds check trips.
    pub fn settle(&mut self, steps: u64) -> Result<SimStatus> {
        self.ensure_idle("ions by settling")?;
        let mode = ForceMode::Settling {
            damping: self.params.settle_damping,
        };
        log::debug!("settling {} ions for {} steps", self.ions.count, steps);

        for step in 0..steps {
            if let Some(report) = self.advance(step, mode) {
                self.status = SimStatus::Aborted(report);
                return Ok(self.status);
            }
        }

        self.ions.velocity.copy_from_slice(&self.initial_velocity);
        self.ions.acceleration.fill(DVec3::ZERO);
        Ok(self.status)
    }

    /// Advance one step. The first call moves an idle simulation to
    /// `Running`. Returns the status after the step.
    pub fn step(&mut self) -> Result<SimStatus> {
        match self.status {
            SimStatus::Idle => self.start(),
            SimStatus::Running => {}
            status => return Err(IonTrapError::NotIdle(status.to_string())),
        }

        if self.steps >= self.total_steps {
            self.finish();
            return Ok(self.status);
        }

        if let Some(report) = self.advance(self.steps, ForceMode::Cooling) {
            self.status = SimStatus::Aborted(report);
            return Ok(self.status);
        }
        self.steps += 1;
        self.report_progress();

        if self.steps >= self.total_steps {
            self.finish();
        }
        Ok(self.status)
    }

    /// Run to completion. Returns the terminal status.
    pub fn run(&mut self) -> Result<SimStatus> {
        self.run_with(|_| {})
    }

    /// Run to completion, handing the simulation to `observer` after every
    /// step for recording. The observer only gets shared access. An aborting
    /// step is observed too, with the offending ion already moved.
    pub fn run_with<F>(&mut self, mut observer: F) -> Result<SimStatus>
    where
        F: FnMut(&Simulation),
    {
        loop {
            let status = self.step()?;
            observer(self);
            if status.is_terminal() {
                return Ok(status);
            }
        }
    }

    fn start(&mut self) {
        self.status = SimStatus::Running;
        self.next_progress = 0;
        log::info!(
            "Simulating {} ions: dt = {:.1e} s, t_max = {:.1e} s ({} steps)",
            self.ions.count,
            self.params.dt,
            self.params.t_max,
            self.total_steps
        );
    }

    fn finish(&mut self) {
        self.status = SimStatus::Finished;
        log::info!("Simulation finished at t = {:.3e} s", self.time());
    }

    fn report_progress(&mut self) {
        let interval = self.params.progress_interval;
        if interval <= 0.0 || self.total_steps == 0 {
            return;
        }
        let fraction = progress_fraction(self.time(), self.params.t_max);
        let mark = (fraction / interval).floor() as u64;
        if mark > self.next_progress {
            self.next_progress = mark;
            log::info!(
                "{:.0}% complete; t = {:.3e}",
                (mark as f64 * interval * 100.0).min(100.0),
                self.time()
            );
        }
    }

    // ---------- integration ----------

    /// One velocity-Verlet step over every ion, in index order.
    ///
    /// The Coulomb buffer is filled from the pre-step positions before any ion
    /// moves. Returns the first bounds violation, leaving later ions of this
    /// step untouched.
    fn advance(&mut self, step: u64, mode: ForceMode) -> Option<AbortReport> {
        let dt = self.params.dt;
        let t_next = (step + 1) as f64 * dt;
        let settling = matches!(mode, ForceMode::Settling { .. });

        if self.params.coulomb_enabled {
            self.compute_coulomb();
        }

        for i in 0..self.ions.count {
            let a_old = self.ions.acceleration[i];
            self.ions.position[i] += self.ions.velocity[i] * dt + 0.5 * a_old * dt * dt;

            let force = self.total_force(i, t_next, mode);
            let a_new = force / self.ions.mass[i];
            self.ions.velocity[i] += 0.5 * (a_old + a_new) * dt;
            self.ions.acceleration[i] = a_new;

            if self.params.stochastic_enabled && !settling {
                self.ions.velocity[i] += collision_kick(
                    self.ions.mass[i],
                    self.params.collision_rate,
                    dt,
                    &mut self.rng,
                );
            }

            if self.params.abort_on_bounds {
                if let Some(report) = self.check_bounds(i, step) {
                    log::error!(
                        "Ion {} out of bounds! Aborting... {} = {:.3e}",
                        report.ion,
                        report.axis,
                        report.value
                    );
                    return Some(report);
                }
            }
        }

        None
    }

    fn compute_coulomb(&mut self) {
        let positions = &self.ions.position;
        let charges = &self.ions.charge;
        let buffer = &mut self.coulomb;

        #[cfg(feature = "parallel")]
        {
            self.pool.install(|| buffer.recompute(positions, charges));
        }

        #[cfg(not(feature = "parallel"))]
        {
            buffer.recompute(positions, charges);
        }
    }

    /// Sum of every enabled force on ion `i` at its current position.
    fn total_force(&self, i: usize, t: f64, mode: ForceMode) -> DVec3 {
        let p = &self.params;
        let ions = &self.ions;
        let (pos, vel) = (ions.position[i], ions.velocity[i]);
        let (mass, charge) = (ions.mass[i], ions.charge[i]);
        let settling = matches!(mode, ForceMode::Settling { .. });

        let mut force = trap_force(pos, mass, charge, &self.trap, p.trap_mode);

        if settling || p.laser_enabled {
            force += laser_force(vel, ions.laser_coolable[i], &self.lasers, mode);
        }
        if p.coulomb_enabled {
            force += self.coulomb.get(i);
        }
        if p.secular_enabled && !settling {
            force += secular_force(pos, charge, &self.trap, t);
        }

        force
    }

    /// Transverse coordinates must be finite and strictly inside the abort
    /// distance.
    fn check_bounds(&self, i: usize, step: u64) -> Option<AbortReport> {
        let pos = self.ions.position[i];
        let limit = self.params.abort_distance;

        [(Axis::X, pos.x), (Axis::Y, pos.y)]
            .into_iter()
            .find(|(_, value)| !(value.abs() < limit))
            .map(|(axis, value)| AbortReport {
                ion: i,
                axis,
                value,
                step,
            })
    }
}

fn warn_placeholder_modes(params: &SimulationParameters) {
    if params.trap_mode == TrapMode::Micromotion {
        log::warn!("RF micromotion mode has no field model yet; the trap exerts no force");
    }
}

#[cfg(feature = "parallel")]
fn build_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("coulomb-{i}"))
        .build()
        .map_err(|e| IonTrapError::ThreadPool(e.to_string()))?;
    log::debug!("Coulomb pool ready with {} threads", pool.current_num_threads());
    Ok(pool)
}
