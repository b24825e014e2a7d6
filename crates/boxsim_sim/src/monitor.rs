//! Kinetic stability monitor.
//!
//! Runs once per frame on top of the physics engine. On decimated frames it
//! reads every tracked body's velocity and writes back a corrected one when
//! the velocity is corrupted, stalled, excessive, or has bled away too much
//! energy. A slower health sweep records whether corruption was ever seen.
//!
//! Particles, their speed ledger and the handle registrations form one
//! generation. `begin_generation` replaces all of them together, so a ledger
//! entry is never read against a handle from another run.

use std::fmt::Debug;
use std::hash::Hash;

use bevy::log::{debug, info, warn};
use boxsim_core::{
    BoxSimError, BoxSimResult, FrictionConfig, MonitorConfig, Particle, ParticleId,
    SimulationConfig,
};
use boxsim_physics::particle::{generate_particles, run_rng};
use boxsim_physics::{SpeedLedger, VelocityClass, classify, correct, restore_drift};
use rand_chacha::ChaCha8Rng;

use crate::engine::PhysicsEngine;
use crate::health::{HealthAggregator, SweepReport};
use crate::scheduler::{Tick, TickScheduler};
use crate::throttle::LogThrottle;

/// One tracked body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration<H> {
    pub particle: ParticleId,
    pub handle: H,
    /// False after the engine failed to answer for this body on the last pass
    pub alive: bool,
}

/// Corrections applied, by cause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionCounts {
    pub invalid: u32,
    pub stalled: u32,
    pub excessive: u32,
    pub drift: u32,
    /// Bodies skipped because the engine reported them asleep
    pub sleeping: u32,
    /// Bodies skipped because a query or write failed
    pub skipped: u32,
}

impl CorrectionCounts {
    fn record(&mut self, class: VelocityClass) {
        match class {
            VelocityClass::Valid => self.drift += 1,
            VelocityClass::Invalid => self.invalid += 1,
            VelocityClass::Stalled => self.stalled += 1,
            VelocityClass::Excessive => self.excessive += 1,
        }
    }

    fn accumulate(&mut self, other: &CorrectionCounts) {
        self.invalid += other.invalid;
        self.stalled += other.stalled;
        self.excessive += other.excessive;
        self.drift += other.drift;
        self.sleeping += other.sleeping;
        self.skipped += other.skipped;
    }

    /// Velocities rewritten
    pub fn corrected(&self) -> u32 {
        self.invalid + self.stalled + self.excessive + self.drift
    }
}

/// What the monitor did on one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramePass {
    pub generation: u64,
    pub tick: Tick,
    pub corrections: CorrectionCounts,
    pub sweep: Option<SweepReport>,
}

struct Generation<H> {
    id: u64,
    particles: Vec<Particle>,
    ledger: SpeedLedger,
    registrations: Vec<Registration<H>>,
    friction: FrictionConfig,
}

impl<H> Generation<H> {
    fn empty() -> Self {
        Self {
            id: 0,
            particles: Vec::new(),
            ledger: SpeedLedger::default(),
            registrations: Vec::new(),
            friction: FrictionConfig {
                particle_particle: false,
                particle_wall: false,
            },
        }
    }
}

pub struct StabilityMonitor<H> {
    policy: MonitorConfig,
    current: Generation<H>,
    scheduler: TickScheduler,
    health: HealthAggregator,
    throttle: LogThrottle<(ParticleId, VelocityClass)>,
    rng: ChaCha8Rng,
    totals: CorrectionCounts,
}

impl<H: Copy + Eq + Hash + Debug> StabilityMonitor<H> {
    /// Monitor with no generation yet; it tracks nothing until
    /// `begin_generation` is called.
    pub fn new(policy: MonitorConfig) -> Self {
        let scheduler = TickScheduler::new(policy.check_interval, policy.sweep_interval);
        Self {
            policy,
            current: Generation::empty(),
            scheduler,
            health: HealthAggregator::default(),
            throttle: LogThrottle::default(),
            rng: run_rng(None),
            totals: CorrectionCounts::default(),
        }
    }

    /// Start a new run: generate particles, build their ledger and drop every
    /// registration, fault and counter of the previous run.
    ///
    /// On error the previous generation is left untouched.
    pub fn begin_generation(&mut self, config: &SimulationConfig) -> BoxSimResult<u64> {
        let mut rng = run_rng(config.seed);
        let particles = generate_particles(config, &mut rng)?;
        let ledger = SpeedLedger::build(&particles);

        let id = self.current.id.wrapping_add(1);
        self.current = Generation {
            id,
            particles,
            ledger,
            registrations: Vec::new(),
            friction: config.friction,
        };
        self.rng = rng;
        self.scheduler.reset();
        self.health.reset();
        self.throttle.clear();
        self.totals = CorrectionCounts::default();

        info!(
            "Generation {}: {} particles (friction-free: {})",
            id,
            self.current.particles.len(),
            config.friction.is_frictionless()
        );
        Ok(id)
    }

    /// Track a freshly instantiated body for `particle`.
    ///
    /// Returns false when the handle is already tracked. Registering against
    /// any generation but the current one is an error.
    pub fn register(
        &mut self,
        generation: u64,
        particle: ParticleId,
        handle: H,
    ) -> BoxSimResult<bool> {
        if generation != self.current.id {
            return Err(BoxSimError::StaleGeneration {
                given: generation,
                current: self.current.id,
            });
        }
        if self.current.registrations.iter().any(|r| r.handle == handle) {
            debug!("Handle {:?} already registered", handle);
            return Ok(false);
        }

        self.current.registrations.push(Registration {
            particle,
            handle,
            alive: true,
        });
        Ok(true)
    }

    /// Per-frame entry point. Corrections and sweeps only run while both
    /// friction toggles are off; liveness is tracked in every regime.
    pub fn on_frame<E>(&mut self, engine: &mut E) -> FramePass
    where
        E: PhysicsEngine<Handle = H>,
    {
        let mut pass = FramePass {
            generation: self.current.id,
            ..FramePass::default()
        };
        if !self.current.friction.is_frictionless() {
            self.refresh_liveness(engine);
            return pass;
        }

        pass.tick = self.scheduler.advance();
        // Sweep first: it must see velocities before this frame repairs them
        if pass.tick.sweep {
            let handles = self.current.registrations.iter().map(|r| r.handle);
            pass.sweep = Some(self.health.sweep(&*engine, handles, &self.policy));
        }
        if pass.tick.check {
            pass.corrections = self.correction_pass(engine);
            self.totals.accumulate(&pass.corrections);
        }

        pass
    }

    /// Mark each registration by whether the engine still answers for it
    fn refresh_liveness<E>(&mut self, engine: &E)
    where
        E: PhysicsEngine<Handle = H>,
    {
        for reg in self.current.registrations.iter_mut() {
            reg.alive = engine.is_sleeping(reg.handle).is_ok();
        }
    }

    fn correction_pass<E>(&mut self, engine: &mut E) -> CorrectionCounts
    where
        E: PhysicsEngine<Handle = H>,
    {
        let mut counts = CorrectionCounts::default();
        let Generation {
            registrations,
            ledger,
            ..
        } = &mut self.current;

        for reg in registrations.iter_mut() {
            match engine.is_sleeping(reg.handle) {
                Ok(true) => {
                    reg.alive = true;
                    counts.sleeping += 1;
                    continue;
                }
                Ok(false) => {}
                Err(err) => {
                    reg.alive = false;
                    counts.skipped += 1;
                    debug!("Skipping particle {}: {}", reg.particle, err);
                    continue;
                }
            }

            let velocity = match engine.linear_velocity(reg.handle) {
                Ok(v) => v,
                Err(err) => {
                    reg.alive = false;
                    counts.skipped += 1;
                    debug!("Skipping particle {}: {}", reg.particle, err);
                    continue;
                }
            };
            reg.alive = true;

            let class = classify(velocity, &self.policy);
            let replacement = match class {
                VelocityClass::Valid => restore_drift(reg.particle, velocity, ledger, &self.policy),
                _ => correct(class, reg.particle, velocity, ledger, &self.policy, &mut self.rng),
            };
            let Some(new_velocity) = replacement else {
                continue;
            };

            if let Err(err) = engine.set_linear_velocity(reg.handle, new_velocity, true) {
                reg.alive = false;
                counts.skipped += 1;
                debug!("Could not correct particle {}: {}", reg.particle, err);
                continue;
            }
            counts.record(class);

            if class != VelocityClass::Valid && self.throttle.should_log((reg.particle, class)) {
                if class == VelocityClass::Invalid {
                    warn!(
                        "Particle {} had a corrupted velocity {:?}; resampled",
                        reg.particle, velocity
                    );
                } else {
                    debug!(
                        "Particle {} {}: {:?} -> {:?}",
                        reg.particle,
                        class.name(),
                        velocity,
                        new_velocity
                    );
                }
            }
        }

        counts
    }

    pub fn generation(&self) -> u64 {
        self.current.id
    }

    pub fn particles(&self) -> &[Particle] {
        &self.current.particles
    }

    pub fn ledger(&self) -> &SpeedLedger {
        &self.current.ledger
    }

    pub fn registrations(&self) -> &[Registration<H>] {
        &self.current.registrations
    }

    /// Tracked bodies the engine still answers for
    pub fn active_particle_count(&self) -> usize {
        self.current.registrations.iter().filter(|r| r.alive).count()
    }

    /// True once a health sweep has seen a corrupted velocity this run
    pub fn fault_state(&self) -> bool {
        self.health.is_faulted()
    }

    /// Corrections applied since the generation began
    pub fn totals(&self) -> CorrectionCounts {
        self.totals
    }

    pub fn frame(&self) -> u32 {
        self.scheduler.frame()
    }

    pub fn policy(&self) -> &MonitorConfig {
        &self.policy
    }
}
