use bevy::prelude::*;
use boxsim_core::{BoxSimResult, MonitorConfig, SimulationConfig, TIME_STEP_SCALE};
use boxsim_physics::thermodynamics;

use crate::monitor::{CorrectionCounts, FramePass, StabilityMonitor};
use crate::world::{BallisticBox, BodyHandle};

/// Bevy plugin wiring the box, its engine and the stability monitor into the
/// frame loop
pub struct BoxSimPlugin;

impl Plugin for BoxSimPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationControls>()
            .init_resource::<MonitorStatus>()
            .init_resource::<StatusThrottle>()
            .add_event::<ResetRequested>()
            .add_systems(Startup, start_simulation)
            .add_systems(
                Update,
                (apply_controls, simulation_tick, publish_status, log_status).chain(),
            );
    }
}

/// Runtime control surface: the toggles and slider of the control panel
#[derive(Resource, Debug, Clone)]
pub struct SimulationControls {
    pub config: SimulationConfig,
    pub playing: bool,
    /// Slider value in [0.01, 1.0]; the engine steps `delta_time * 0.01` s per frame
    pub delta_time: f32,
}

impl Default for SimulationControls {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl SimulationControls {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            playing: true,
            delta_time: 0.5,
        }
    }

    pub fn time_step(&self) -> f32 {
        self.delta_time.clamp(0.01, 1.0) * TIME_STEP_SCALE
    }
}

/// Explicit request to respawn every particle with the current config
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ResetRequested;

/// What the UI layer may show about the monitor
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct MonitorStatus {
    pub generation: u64,
    /// A corrupted velocity has been seen since the last reset
    pub fault: bool,
    pub active_particles: usize,
    pub frame: u32,
    pub totals: CorrectionCounts,
}

/// Frame counter for the periodic status line
#[derive(Resource, Default)]
pub struct StatusThrottle {
    pub frame: u32,
}

const STATUS_LOG_INTERVAL: u32 = 300;

/// The box's engine together with the monitor guarding it
#[derive(Resource)]
pub struct BoxSim {
    pub world: BallisticBox,
    pub monitor: StabilityMonitor<BodyHandle>,
    pub config: SimulationConfig,
}

impl BoxSim {
    pub fn new(config: &SimulationConfig, policy: MonitorConfig) -> BoxSimResult<Self> {
        let mut sim = Self {
            world: BallisticBox::new(config),
            monitor: StabilityMonitor::new(policy),
            config: config.clone(),
        };
        sim.reset(config)?;
        Ok(sim)
    }

    /// Replace the whole particle generation. Nothing changes if `config`
    /// is rejected.
    pub fn reset(&mut self, config: &SimulationConfig) -> BoxSimResult<u64> {
        let generation = self.monitor.begin_generation(config)?;
        self.world.reset(config);

        let particles = self.monitor.particles().to_vec();
        for particle in &particles {
            let handle = self.world.spawn(particle)?;
            self.monitor.register(generation, particle.id, handle)?;
        }

        self.config = config.clone();
        Ok(generation)
    }

    /// Step the engine, then let the monitor inspect the result
    pub fn frame(&mut self, dt: f32) -> FramePass {
        self.world.step(dt);
        self.monitor.on_frame(&mut self.world)
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            generation: self.monitor.generation(),
            fault: self.monitor.fault_state(),
            active_particles: self.monitor.active_particle_count(),
            frame: self.monitor.frame(),
            totals: self.monitor.totals(),
        }
    }
}

fn start_simulation(mut commands: Commands, controls: Res<SimulationControls>) {
    match BoxSim::new(&controls.config, MonitorConfig::default()) {
        Ok(sim) => {
            info!(
                "Box ready: {} particles in a {:.2} m container",
                sim.world.body_count(),
                sim.config.container_size
            );
            commands.insert_resource(sim);
        }
        Err(err) => error!("Cannot start simulation: {err}"),
    }
}

/// Reset on request or whenever the config differs from the running one.
/// A rejected config is reported once and the old run keeps going.
fn apply_controls(
    controls: Res<SimulationControls>,
    sim: Option<ResMut<BoxSim>>,
    mut resets: EventReader<ResetRequested>,
    mut rejected: Local<Option<SimulationConfig>>,
) {
    let requested = resets.read().count() > 0;
    let Some(mut sim) = sim else {
        return;
    };

    let changed = sim.config != controls.config;
    if !requested && (!changed || rejected.as_ref() == Some(&controls.config)) {
        return;
    }

    match sim.reset(&controls.config) {
        Ok(generation) => {
            *rejected = None;
            info!("Simulation reset (generation {})", generation);
        }
        Err(err) => {
            if rejected.as_ref() != Some(&controls.config) {
                error!("Reset rejected: {err}");
            }
            *rejected = Some(controls.config.clone());
        }
    }
}

fn simulation_tick(controls: Res<SimulationControls>, sim: Option<ResMut<BoxSim>>) {
    let Some(mut sim) = sim else {
        return;
    };
    if !controls.playing {
        return;
    }
    sim.frame(controls.time_step());
}

fn publish_status(sim: Option<Res<BoxSim>>, mut status: ResMut<MonitorStatus>) {
    let Some(sim) = sim else {
        return;
    };
    let next = sim.status();
    if *status != next {
        *status = next;
    }
}

/// Status line every few seconds (formatting every frame is wasteful)
fn log_status(
    sim: Option<Res<BoxSim>>,
    status: Res<MonitorStatus>,
    mut throttle: ResMut<StatusThrottle>,
) {
    throttle.frame = throttle.frame.wrapping_add(1);
    if throttle.frame % STATUS_LOG_INTERVAL != 0 {
        return;
    }
    let Some(sim) = sim else {
        return;
    };

    let stats = thermodynamics::kinetic_stats(sim.world.velocities());
    let fault = if status.fault { " [FAULT]" } else { "" };
    info!(
        "Gen {} | Particles: {} | Mean speed: {:.3} | KE: {:.3} | Corrected: {}{}",
        status.generation,
        status.active_particles,
        stats.mean_speed,
        stats.kinetic_energy,
        status.totals.corrected(),
        fault
    );
}
