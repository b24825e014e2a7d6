pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{FrictionConfig, MonitorConfig, SimulationConfig};
pub use constants::*;
pub use error::{BoxSimError, BoxSimResult};
pub use types::*;
