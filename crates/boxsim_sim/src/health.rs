use bevy::log::warn;
use boxsim_core::MonitorConfig;
use boxsim_physics::{VelocityClass, classify};

use crate::engine::PhysicsEngine;

/// Outcome of one health sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub inspected: usize,
    pub invalid: usize,
    /// Bodies the engine could not answer for
    pub unreachable: usize,
}

/// Tracks whether a critical numeric fault has been seen in the current run.
///
/// The fault flag only ever goes from false to true; `reset` is the sole way
/// back.
#[derive(Debug, Clone, Default)]
pub struct HealthAggregator {
    faulted: bool,
    sweeps: u32,
}

impl HealthAggregator {
    /// Classify every handle read-only. Only corrupted velocities count as
    /// faults; excessive but finite ones do not.
    pub fn sweep<E: PhysicsEngine>(
        &mut self,
        engine: &E,
        handles: impl IntoIterator<Item = E::Handle>,
        policy: &MonitorConfig,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        for handle in handles {
            let Ok(velocity) = engine.linear_velocity(handle) else {
                report.unreachable += 1;
                continue;
            };
            report.inspected += 1;
            if classify(velocity, policy) == VelocityClass::Invalid {
                report.invalid += 1;
            }
        }

        self.sweeps = self.sweeps.wrapping_add(1);
        if report.invalid > 0 && !self.faulted {
            warn!(
                "Numeric fault: {} of {} particles carry corrupted velocities",
                report.invalid, report.inspected
            );
            self.faulted = true;
        }

        report
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn sweeps(&self) -> u32 {
        self.sweeps
    }

    pub fn reset(&mut self) {
        self.faulted = false;
        self.sweeps = 0;
    }
}
