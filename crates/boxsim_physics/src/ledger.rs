use std::collections::HashMap;

use boxsim_core::{Particle, ParticleId};
use serde::{Deserialize, Serialize};

/// Spawn-time speed of every particle in one generation.
///
/// Built right after generation and read-only afterwards; a reset builds a
/// new ledger rather than editing this one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedLedger {
    speeds: HashMap<ParticleId, f32>,
}

impl SpeedLedger {
    pub fn build(particles: &[Particle]) -> Self {
        let speeds = particles
            .iter()
            .map(|p| (p.id, p.initial_speed()))
            .collect();
        Self { speeds }
    }

    /// Recorded speed, or `None` for ids this generation never spawned
    pub fn lookup(&self, id: ParticleId) -> Option<f32> {
        self.speeds.get(&id).copied()
    }

    /// Recorded speed with a fallback for unknown ids
    pub fn speed_or(&self, id: ParticleId, fallback: f32) -> f32 {
        self.lookup(id).unwrap_or(fallback)
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    /// Entries sorted by id
    pub fn entries(&self) -> Vec<(ParticleId, f32)> {
        let mut entries: Vec<_> = self.speeds.iter().map(|(&id, &s)| (id, s)).collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{generate_particles, run_rng};
    use boxsim_core::SimulationConfig;

    #[test]
    fn test_lookup_matches_initial_speed() {
        let config = SimulationConfig::default();
        let particles = generate_particles(&config, &mut run_rng(Some(5))).unwrap();
        let ledger = SpeedLedger::build(&particles);

        assert_eq!(ledger.len(), particles.len());
        for p in &particles {
            assert_eq!(ledger.lookup(p.id), Some(p.initial_speed()));
        }
    }

    #[test]
    fn test_unknown_id_falls_back() {
        let ledger = SpeedLedger::build(&[Particle::new(0, [0.0; 3], [0.3, 0.0, 0.4])]);
        assert!(ledger.lookup(99).is_none());
        assert_eq!(ledger.speed_or(99, 0.5), 0.5);
        assert!((ledger.speed_or(0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_entries_sorted() {
        let ledger = SpeedLedger::build(&[
            Particle::new(2, [0.0; 3], [1.0, 0.0, 0.0]),
            Particle::new(0, [0.0; 3], [2.0, 0.0, 0.0]),
            Particle::new(1, [0.0; 3], [3.0, 0.0, 0.0]),
        ]);
        let ids: Vec<_> = ledger.entries().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(SpeedLedger::default().is_empty());
    }
}
