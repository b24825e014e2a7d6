//! Error types for boxsim.
//!
//! Runtime numeric faults in particle state are data, not errors: they are
//! corrected in place by the stability monitor and never surface here.

use thiserror::Error;

/// Unified error type for all boxsim crates.
#[derive(Debug, Error)]
pub enum BoxSimError {
    /// Generator or configuration input is out of domain.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A body query or mutation failed against the physics engine.
    #[error("Body query failed for handle {handle}: {reason}")]
    BodyQuery { handle: String, reason: String },

    /// A registration was attempted against a generation that is no longer current.
    #[error("Stale generation {given} (current: {current})")]
    StaleGeneration { given: u64, current: u64 },

    /// Snapshot or config persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Convenience alias for `Result<T, BoxSimError>`.
pub type BoxSimResult<T> = Result<T, BoxSimError>;
