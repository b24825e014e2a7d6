// Numeric policy for the kinetic stability monitor.
// Units are the engine's: metres and metres per second, container centred on the origin.

/// Any velocity component beyond this magnitude is solver blow-up, not physics
pub const CORRUPTION_COMPONENT_LIMIT: f32 = 100.0;

/// Below this speed a particle visibly freezes
pub const STALL_SPEED: f32 = 0.1;

/// Soft speed cap; faster particles are scaled back down to exactly this
pub const EXCESSIVE_SPEED: f32 = 10.0;

/// Upper bound on the speed given to a particle recovered from corruption
pub const INVALID_RECOVERY_SPEED_CAP: f32 = 2.0;

/// Upper bound on the speed given to a stalled particle
pub const STALL_RECOVERY_SPEED_CAP: f32 = 1.0;

/// Upper bound on the speed a drifted particle is restored to
pub const DRIFT_RECOVERY_SPEED_CAP: f32 = 5.0;

/// Relative speed loss tolerated before a valid particle is restored
pub const DRIFT_TOLERANCE: f32 = 0.1;

/// Reference speed used when the ledger has no entry for a particle
pub const FALLBACK_SPEED: f32 = 0.5;

/// Correction pass runs on every Nth frame
pub const CHECK_INTERVAL: u32 = 3;

/// Health sweep runs on every Nth correction pass
pub const SWEEP_INTERVAL: u32 = 100;

/// Gravity along -y when enabled (m/s^2)
pub const GRAVITY: f32 = 9.81;

/// Engine step length per unit of the δt control
pub const TIME_STEP_SCALE: f32 = 0.01;
