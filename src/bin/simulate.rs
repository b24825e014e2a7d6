//! Headless batch run of the particle box.
//! Runs the same scene with and without friction and reports how much work
//! the stability monitor did in each.

use boxsim_core::{MonitorConfig, SimulationConfig};
use boxsim_physics::thermodynamics;
use boxsim_sim::monitor::CorrectionCounts;
use boxsim_sim::pipeline::{BoxSim, SimulationControls};
use boxsim_storage::{RunSnapshot, save_snapshot};
use std::path::PathBuf;

const FRAMES: u32 = 3_600;
const RUNS: u64 = 5;

struct Outcome {
    label: &'static str,
    seed: u64,
    totals: CorrectionCounts,
    mean_speed: f64,
    kinetic_energy: f64,
    active: usize,
    fault: bool,
}

fn run(label: &'static str, config: SimulationConfig) -> Result<(Outcome, RunSnapshot), String> {
    let controls = SimulationControls::new(config.clone());
    let mut sim = BoxSim::new(&config, MonitorConfig::default()).map_err(|e| e.to_string())?;

    for _ in 0..FRAMES {
        sim.frame(controls.time_step());
    }

    let stats = thermodynamics::kinetic_stats(sim.world.velocities());
    let status = sim.status();
    let snapshot = RunSnapshot::new(
        status.generation,
        &sim.config,
        sim.monitor.particles(),
        sim.monitor.ledger(),
        status.fault,
        status.frame,
    );

    Ok((
        Outcome {
            label,
            seed: config.seed.unwrap_or_default(),
            totals: status.totals,
            mean_speed: stats.mean_speed,
            kinetic_energy: stats.kinetic_energy,
            active: status.active_particles,
            fault: status.fault,
        },
        snapshot,
    ))
}

fn main() {
    eprintln!("Running {} frames per scenario over {} seeds...", FRAMES, RUNS);

    let mut outcomes = Vec::new();
    for i in 0..RUNS {
        let seed = 1000 + i * 7919;
        let frictionless = SimulationConfig {
            seed: Some(seed),
            ..SimulationConfig::frictionless()
        };
        let with_friction = SimulationConfig {
            seed: Some(seed),
            ..SimulationConfig::default()
        };

        for (label, config) in [("frictionless", frictionless), ("friction", with_friction)] {
            match run(label, config) {
                Ok((outcome, snapshot)) => {
                    let path = PathBuf::from("runs").join(format!("{}-{}.bin", label, seed));
                    if let Err(e) = save_snapshot(&snapshot, &path) {
                        eprintln!("Could not save {}: {}", path.display(), e);
                    }
                    outcomes.push(outcome);
                }
                Err(e) => eprintln!("{} run (seed {}) failed: {}", label, seed, e),
            }
        }
    }

    println!(
        "{:<14} {:>6} {:>8} {:>8} {:>9} {:>7} {:>7} {:>10} {:>8} {:>6}",
        "scenario", "seed", "invalid", "stalled", "excessive", "drift", "active", "mean |v|", "KE",
        "fault"
    );
    for o in &outcomes {
        println!(
            "{:<14} {:>6} {:>8} {:>8} {:>9} {:>7} {:>7} {:>10.3} {:>8.3} {:>6}",
            o.label,
            o.seed,
            o.totals.invalid,
            o.totals.stalled,
            o.totals.excessive,
            o.totals.drift,
            o.active,
            o.mean_speed,
            o.kinetic_energy,
            o.fault
        );
    }

    let faults = outcomes.iter().filter(|o| o.fault).count();
    println!("\n{} of {} runs reported a numeric fault", faults, outcomes.len());
}
