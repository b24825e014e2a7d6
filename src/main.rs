use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use boxsim_core::SimulationConfig;
use boxsim_sim::pipeline::{BoxSimPlugin, SimulationControls};

fn main() {
    let config = SimulationConfig::frictionless();

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
            LogPlugin::default(),
        ))
        .insert_resource(SimulationControls::new(config))
        .add_plugins(BoxSimPlugin)
        .run();
}
