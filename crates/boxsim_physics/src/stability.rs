//! Velocity classification and the corrective policy of the kinetic
//! stability monitor.
//!
//! A frictionless, near-elastic box makes a general-purpose rigid-body solver
//! bleed energy, occasionally inject it, and now and then produce corrupted
//! state. These functions decide what a particle's velocity should be replaced
//! with; writing it back to the engine is the caller's job.

use boxsim_core::{MonitorConfig, ParticleId, Vec3, is_finite, length, scale};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ledger::SpeedLedger;
use crate::particle::random_direction;

/// Health of a single velocity vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VelocityClass {
    Valid,
    /// NaN, infinite, or a component beyond the corruption limit
    Invalid,
    /// Too slow to be visibly moving
    Stalled,
    /// Finite but above the soft speed cap
    Excessive,
}

impl VelocityClass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Stalled => "stalled",
            Self::Excessive => "excessive",
        }
    }
}

/// Classify a velocity. Corruption wins over the speed checks; stall and
/// excess are disjoint thresholds on the same scalar speed.
pub fn classify(v: Vec3, policy: &MonitorConfig) -> VelocityClass {
    if !is_finite(v) || v.iter().any(|c| c.abs() > policy.corruption_limit) {
        return VelocityClass::Invalid;
    }

    let speed = length(v);
    if speed < policy.stall_speed {
        VelocityClass::Stalled
    } else if speed > policy.excessive_speed {
        VelocityClass::Excessive
    } else {
        VelocityClass::Valid
    }
}

/// Replacement velocity for a classified particle, `None` when it is valid.
pub fn correct(
    class: VelocityClass,
    id: ParticleId,
    v: Vec3,
    ledger: &SpeedLedger,
    policy: &MonitorConfig,
    rng: &mut impl Rng,
) -> Option<Vec3> {
    let original = ledger.speed_or(id, policy.fallback_speed);

    match class {
        VelocityClass::Valid => None,
        VelocityClass::Invalid => {
            // Nothing in a corrupted vector is trustworthy, direction included
            let speed = original.min(policy.invalid_recovery_cap);
            Some(scale(random_direction(rng), speed))
        }
        VelocityClass::Stalled => {
            let speed = original.min(policy.stall_recovery_cap);
            Some(scale(random_direction(rng), speed))
        }
        VelocityClass::Excessive => {
            let speed = length(v);
            Some(scale(v, policy.excessive_speed / speed))
        }
    }
}

/// Restore a valid particle that has lost more than the drift tolerance of
/// its spawn speed. Direction is kept.
///
/// Only lost energy is recovered: a particle that sped up stays fast until it
/// crosses the excessive threshold.
pub fn restore_drift(
    id: ParticleId,
    v: Vec3,
    ledger: &SpeedLedger,
    policy: &MonitorConfig,
) -> Option<Vec3> {
    let original = ledger.speed_or(id, policy.fallback_speed);
    let speed = length(v);

    if speed <= 0.0 || speed >= original * (1.0 - policy.drift_tolerance) {
        return None;
    }

    let target = original.min(policy.drift_recovery_cap);
    if target <= speed {
        return None;
    }

    Some(scale(v, target / speed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{generate_particles, run_rng};
    use boxsim_core::{Particle, SimulationConfig};

    fn policy() -> MonitorConfig {
        MonitorConfig::default()
    }

    fn ledger_with(id: ParticleId, speed: f32) -> SpeedLedger {
        SpeedLedger::build(&[Particle::new(id, [0.0; 3], [speed, 0.0, 0.0])])
    }

    #[test]
    fn test_non_finite_is_invalid() {
        let p = policy();
        assert_eq!(classify([f32::NAN, 0.0, 0.0], &p), VelocityClass::Invalid);
        assert_eq!(classify([0.0, f32::INFINITY, 0.0], &p), VelocityClass::Invalid);
        assert_eq!(classify([0.0, 0.0, f32::NEG_INFINITY], &p), VelocityClass::Invalid);
    }

    #[test]
    fn test_explosive_component_is_invalid() {
        let p = policy();
        assert_eq!(classify([100.5, 0.0, 0.0], &p), VelocityClass::Invalid);
        assert_eq!(classify([0.0, -250.0, 0.0], &p), VelocityClass::Invalid);
        // Exactly at the limit is merely excessive
        assert_eq!(classify([100.0, 0.0, 0.0], &p), VelocityClass::Excessive);
    }

    #[test]
    fn test_speed_thresholds() {
        let p = policy();
        assert_eq!(classify([0.0, 0.0, 0.0], &p), VelocityClass::Stalled);
        assert_eq!(classify([0.05, 0.05, 0.0], &p), VelocityClass::Stalled);
        assert_eq!(classify([0.1, 0.0, 0.0], &p), VelocityClass::Valid);
        assert_eq!(classify([1.0, 1.0, 1.0], &p), VelocityClass::Valid);
        assert_eq!(classify([10.0, 0.0, 0.0], &p), VelocityClass::Valid);
        assert_eq!(classify([8.0, 8.0, 0.0], &p), VelocityClass::Excessive);
    }

    #[test]
    fn test_valid_is_never_corrected() {
        let p = policy();
        let ledger = ledger_with(0, 0.8);
        let mut rng = run_rng(Some(1));
        for v in [[0.5, 0.0, 0.0], [0.01, 9.0, 0.0], [3.0, -3.0, 3.0]] {
            for _ in 0..3 {
                assert_eq!(correct(VelocityClass::Valid, 0, v, &ledger, &p, &mut rng), None);
            }
        }
    }

    #[test]
    fn test_invalid_recovery_capped() {
        let p = policy();
        let mut rng = run_rng(Some(2));
        for original in [0.0, 0.3, 1.9, 2.0, 7.5, 1e6] {
            let ledger = ledger_with(4, original);
            let v = correct(VelocityClass::Invalid, 4, [f32::NAN, 0.0, 0.0], &ledger, &p, &mut rng)
                .unwrap();
            assert!(is_finite(v));
            let speed = length(v);
            assert!(speed <= 2.0 + 1e-5, "speed = {}", speed);
            assert!((speed - original.min(2.0)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_stalled_recovery_capped() {
        let p = policy();
        let mut rng = run_rng(Some(3));
        for original in [0.2, 0.99, 4.0] {
            let ledger = ledger_with(1, original);
            let v = correct(VelocityClass::Stalled, 1, [0.0; 3], &ledger, &p, &mut rng).unwrap();
            let speed = length(v);
            assert!(speed <= 1.0 + 1e-5);
            assert!((speed - original.min(1.0)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_unknown_particle_uses_fallback_speed() {
        let p = policy();
        let mut rng = run_rng(Some(4));
        let ledger = SpeedLedger::default();
        let v = correct(VelocityClass::Stalled, 12, [0.0; 3], &ledger, &p, &mut rng).unwrap();
        assert!((length(v) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_drift_on_unknown_particle_uses_fallback_speed() {
        let p = policy();
        let ledger = SpeedLedger::default();
        let fixed = restore_drift(12, [0.0, 0.0, 0.3], &ledger, &p).unwrap();
        assert!((fixed[2] - 0.5).abs() < 1e-5);
        assert_eq!(fixed[0], 0.0);
        assert!(restore_drift(12, [0.0, 0.0, 0.47], &ledger, &p).is_none());
    }

    #[test]
    fn test_excessive_rescaled_along_direction() {
        let p = policy();
        let mut rng = run_rng(Some(5));
        let ledger = ledger_with(0, 1.0);

        let v = [20.0, 0.0, 0.0];
        assert_eq!(classify(v, &p), VelocityClass::Excessive);
        let fixed = correct(VelocityClass::Excessive, 0, v, &ledger, &p, &mut rng).unwrap();
        assert!((fixed[0] - 10.0).abs() < 1e-5);
        assert_eq!(fixed[1], 0.0);
        assert_eq!(fixed[2], 0.0);

        let v = [12.0, -9.0, 20.0];
        let fixed = correct(VelocityClass::Excessive, 0, v, &ledger, &p, &mut rng).unwrap();
        assert!((length(fixed) - 10.0).abs() < 1e-4);
        let k = fixed[0] / v[0];
        assert!((fixed[1] - v[1] * k).abs() < 1e-4);
        assert!((fixed[2] - v[2] * k).abs() < 1e-4);
    }

    #[test]
    fn test_drift_restores_lost_speed() {
        let p = policy();
        let ledger = ledger_with(0, 0.8);
        let fixed = restore_drift(0, [0.0, 0.5, 0.0], &ledger, &p).unwrap();
        assert!((fixed[1] - 0.8).abs() < 1e-5);
        assert_eq!(fixed[0], 0.0);
    }

    #[test]
    fn test_drift_within_tolerance_left_alone() {
        let p = policy();
        let ledger = ledger_with(0, 1.0);
        assert!(restore_drift(0, [0.95, 0.0, 0.0], &ledger, &p).is_none());
        assert!(restore_drift(0, [0.91, 0.0, 0.0], &ledger, &p).is_none());
    }

    #[test]
    fn test_drift_never_slows_fast_particles() {
        let p = policy();
        let ledger = ledger_with(0, 1.0);
        assert!(restore_drift(0, [4.0, 0.0, 0.0], &ledger, &p).is_none());

        // Restoring towards the cap must not slow a particle already above it
        let ledger = ledger_with(0, 9.0);
        assert!(restore_drift(0, [6.0, 0.0, 0.0], &ledger, &p).is_none());
        let fixed = restore_drift(0, [2.0, 0.0, 0.0], &ledger, &p).unwrap();
        assert!((fixed[0] - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_generated_scene_recovers_from_corruption() {
        let config = SimulationConfig {
            particle_count: 100,
            particle_radius: 0.08,
            container_size: 2.5,
            target_speed: 1.0,
            ..SimulationConfig::default()
        };
        let mut rng = run_rng(Some(99));
        let particles = generate_particles(&config, &mut rng).unwrap();
        let ledger = SpeedLedger::build(&particles);
        for p in &particles {
            let speed = ledger.lookup(p.id).unwrap();
            assert!(speed >= 0.5 - 1e-5 && speed <= 1.0 + 1e-5);
        }

        let policy = policy();
        let ledger = ledger_with(3, 0.8);
        let v = [f32::NAN, 0.0, 0.0];
        let class = classify(v, &policy);
        assert_eq!(class, VelocityClass::Invalid);
        let fixed = correct(class, 3, v, &ledger, &policy, &mut rng).unwrap();
        assert!(fixed.iter().all(|c| !c.is_nan()));
        assert!((length(fixed) - 0.8).abs() < 1e-5);
    }
}
