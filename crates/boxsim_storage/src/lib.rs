use boxsim_core::{BoxSimError, BoxSimResult, Particle, ParticleId, SimulationConfig};
use boxsim_physics::SpeedLedger;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Record of one particle generation, for replay and offline inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub id: Uuid,
    pub generation: u64,
    pub config: SimulationConfig,
    pub particles: Vec<Particle>,
    /// Spawn speeds sorted by particle id
    pub ledger: Vec<(ParticleId, f32)>,
    pub fault: bool,
    /// Frames elapsed in this generation when the snapshot was taken
    pub frame: u32,
}

impl RunSnapshot {
    pub fn new(
        generation: u64,
        config: &SimulationConfig,
        particles: &[Particle],
        ledger: &SpeedLedger,
        fault: bool,
        frame: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            generation,
            config: config.clone(),
            particles: particles.to_vec(),
            ledger: ledger.entries(),
            fault,
            frame,
        }
    }

    /// Rebuild the ledger from the stored particles
    pub fn rebuild_ledger(&self) -> SpeedLedger {
        SpeedLedger::build(&self.particles)
    }
}

/// Save a snapshot to disk as bincode
pub fn save_snapshot(snapshot: &RunSnapshot, path: &Path) -> BoxSimResult<()> {
    write_bincode(snapshot, path)
}

/// Load a snapshot from disk
pub fn load_snapshot(path: &Path) -> BoxSimResult<RunSnapshot> {
    read_bincode(path)
}

pub fn save_config(config: &SimulationConfig, path: &Path) -> BoxSimResult<()> {
    write_bincode(config, path)
}

/// Load a config and check it is usable before handing it out
pub fn load_config(path: &Path) -> BoxSimResult<SimulationConfig> {
    let config: SimulationConfig = read_bincode(path)?;
    config.validate()?;
    Ok(config)
}

fn write_bincode<T: Serialize>(value: &T, path: &Path) -> BoxSimResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| BoxSimError::Storage(format!("Failed to create dir: {e}")))?;
    }
    let data = bincode::serialize(value)
        .map_err(|e| BoxSimError::Storage(format!("Serialize error: {e}")))?;
    fs::write(path, data).map_err(|e| BoxSimError::Storage(format!("Write error: {e}")))?;
    Ok(())
}

fn read_bincode<T: for<'de> Deserialize<'de>>(path: &Path) -> BoxSimResult<T> {
    let data = fs::read(path).map_err(|e| BoxSimError::Storage(format!("Read error: {e}")))?;
    bincode::deserialize(&data)
        .map_err(|e| BoxSimError::Storage(format!("Deserialize error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxsim_physics::particle::{generate_particles, run_rng};
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("boxsim-{}", Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_snapshot_survives_disk() {
        let config = SimulationConfig {
            seed: Some(3),
            ..SimulationConfig::frictionless()
        };
        let particles = generate_particles(&config, &mut run_rng(config.seed)).unwrap();
        let ledger = SpeedLedger::build(&particles);
        let snapshot = RunSnapshot::new(4, &config, &particles, &ledger, true, 900);

        let path = scratch("run.bin");
        save_snapshot(&snapshot, &path).unwrap();
        let loaded = load_snapshot(&path).unwrap();

        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.rebuild_ledger(), ledger);
        assert_eq!(loaded.ledger.len(), 100);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_config_validates() {
        let path = scratch("config.bin");
        let bad = SimulationConfig {
            particle_count: 0,
            ..SimulationConfig::default()
        };
        save_config(&bad, &path).unwrap();
        assert!(matches!(
            load_config(&path),
            Err(BoxSimError::InvalidParameters(_))
        ));

        save_config(&SimulationConfig::default(), &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), SimulationConfig::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_is_storage_error() {
        let path = scratch("absent.bin");
        assert!(matches!(load_snapshot(&path), Err(BoxSimError::Storage(_))));
    }
}
