use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{BoxSimError, BoxSimResult};

/// Which contact pairs carry friction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrictionConfig {
    pub particle_particle: bool,
    pub particle_wall: bool,
}

impl FrictionConfig {
    /// The stability monitor only acts in the friction-free regime
    pub fn is_frictionless(&self) -> bool {
        !self.particle_particle && !self.particle_wall
    }
}

/// Simulation configuration. Fixed for one run; any change means a full reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of particles spawned per run
    pub particle_count: u32,
    /// Ball collider radius
    pub particle_radius: f32,
    /// Side length of the cubic container, centred on the origin
    pub container_size: f32,
    /// Bounciness of every collider (1.0 = perfectly elastic)
    pub restitution: f32,
    pub friction: FrictionConfig,
    pub gravity_enabled: bool,
    /// Upper bound of the spawn speed range
    pub target_speed: f32,
    /// Random seed for deterministic runs; `None` draws a fresh one per run
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: 100,
            particle_radius: 0.08,
            container_size: 2.5,
            restitution: 0.7,
            friction: FrictionConfig {
                particle_particle: true,
                particle_wall: false,
            },
            gravity_enabled: false,
            target_speed: 1.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Default scene with both friction toggles off, the regime the monitor guards
    pub fn frictionless() -> Self {
        Self {
            friction: FrictionConfig {
                particle_particle: false,
                particle_wall: false,
            },
            ..Self::default()
        }
    }

    pub fn half_size(&self) -> f32 {
        self.container_size / 2.0
    }

    /// Gravity vector applied by the engine
    pub fn gravity(&self) -> [f32; 3] {
        if self.gravity_enabled {
            [0.0, -GRAVITY, 0.0]
        } else {
            [0.0, 0.0, 0.0]
        }
    }

    /// Reject parameters the particle generator cannot satisfy
    pub fn validate(&self) -> BoxSimResult<()> {
        if self.particle_count < 1 {
            return Err(BoxSimError::InvalidParameters(
                "particle_count must be at least 1".into(),
            ));
        }
        if !(self.particle_radius > 0.0) || !self.particle_radius.is_finite() {
            return Err(BoxSimError::InvalidParameters(format!(
                "particle_radius must be positive, got {}",
                self.particle_radius
            )));
        }
        if !(self.container_size > self.particle_radius * 4.0) || !self.container_size.is_finite()
        {
            return Err(BoxSimError::InvalidParameters(format!(
                "container_size {} leaves no room for particles of radius {}",
                self.container_size, self.particle_radius
            )));
        }
        if !(self.target_speed >= 0.0) || !self.target_speed.is_finite() {
            return Err(BoxSimError::InvalidParameters(format!(
                "target_speed must be finite and non-negative, got {}",
                self.target_speed
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(BoxSimError::InvalidParameters(format!(
                "restitution must lie in [0, 1], got {}",
                self.restitution
            )));
        }
        Ok(())
    }
}

/// Thresholds and cadence of the kinetic stability monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub corruption_limit: f32,
    pub stall_speed: f32,
    pub excessive_speed: f32,
    pub invalid_recovery_cap: f32,
    pub stall_recovery_cap: f32,
    pub drift_recovery_cap: f32,
    pub drift_tolerance: f32,
    pub fallback_speed: f32,
    /// Correction pass every Nth frame
    pub check_interval: u32,
    /// Health sweep every Nth correction pass
    pub sweep_interval: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            corruption_limit: CORRUPTION_COMPONENT_LIMIT,
            stall_speed: STALL_SPEED,
            excessive_speed: EXCESSIVE_SPEED,
            invalid_recovery_cap: INVALID_RECOVERY_SPEED_CAP,
            stall_recovery_cap: STALL_RECOVERY_SPEED_CAP,
            drift_recovery_cap: DRIFT_RECOVERY_SPEED_CAP,
            drift_tolerance: DRIFT_TOLERANCE,
            fallback_speed: FALLBACK_SPEED,
            check_interval: CHECK_INTERVAL,
            sweep_interval: SWEEP_INTERVAL,
        }
    }
}
