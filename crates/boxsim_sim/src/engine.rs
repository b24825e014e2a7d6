use std::fmt::Debug;
use std::hash::Hash;

use boxsim_core::{BoxSimResult, Vec3};

/// The slice of a rigid-body engine the stability monitor relies on.
///
/// Handles are owned by the engine; callers only keep copies of them and must
/// expect any query to fail with `BoxSimError::BodyQuery` once a body is gone.
pub trait PhysicsEngine {
    type Handle: Copy + Eq + Hash + Debug;

    fn linear_velocity(&self, handle: Self::Handle) -> BoxSimResult<Vec3>;

    /// Overwrite a body's velocity. `wake` lifts the body out of sleep.
    fn set_linear_velocity(
        &mut self,
        handle: Self::Handle,
        velocity: Vec3,
        wake: bool,
    ) -> BoxSimResult<()>;

    fn is_sleeping(&self, handle: Self::Handle) -> BoxSimResult<bool>;
}
