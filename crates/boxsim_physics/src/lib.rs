pub mod ledger;
pub mod particle;
pub mod stability;
pub mod thermodynamics;

pub use ledger::SpeedLedger;
pub use stability::{VelocityClass, classify, correct, restore_drift};
