use std::fmt;

use boxsim_core::{BoxSimError, BoxSimResult, Particle, SimulationConfig, Vec3, length};

use crate::engine::PhysicsEngine;

/// Speed below which a body starts counting towards sleep
const SLEEP_SPEED: f32 = 0.01;

/// Consecutive quiet steps before a body falls asleep
const SLEEP_STEPS: u32 = 60;

/// Fraction of tangential velocity kept after touching a wall with friction
const WALL_FRICTION_KEEP: f32 = 0.6;

/// Handle to a body in a `BallisticBox`. Becomes stale when the box is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    epoch: u32,
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.epoch)
    }
}

#[derive(Debug, Clone)]
struct Body {
    position: Vec3,
    velocity: Vec3,
    sleeping: bool,
    quiet_steps: u32,
}

/// Minimal in-process engine: ballistic bodies bouncing inside a cube.
///
/// Only wall contacts are resolved. Wall bounces keep `restitution` of the
/// normal velocity, which is enough to reproduce the slow energy bleed the
/// stability monitor exists to undo.
#[derive(Debug, Clone)]
pub struct BallisticBox {
    bodies: Vec<Option<Body>>,
    epoch: u32,
    /// Furthest a body centre may travel from the origin on each axis
    limit: f32,
    restitution: f32,
    wall_friction: bool,
    gravity: Vec3,
}

impl BallisticBox {
    pub fn new(config: &SimulationConfig) -> Self {
        let mut world = Self {
            bodies: Vec::new(),
            epoch: 0,
            limit: 0.0,
            restitution: 0.0,
            wall_friction: false,
            gravity: [0.0; 3],
        };
        world.configure(config);
        world
    }

    /// Drop every body and invalidate all outstanding handles
    pub fn reset(&mut self, config: &SimulationConfig) {
        self.bodies.clear();
        self.epoch = self.epoch.wrapping_add(1);
        self.configure(config);
    }

    fn configure(&mut self, config: &SimulationConfig) {
        self.limit = config.half_size() - config.particle_radius;
        self.restitution = config.restitution;
        self.wall_friction = config.friction.particle_wall;
        self.gravity = config.gravity();
    }

    pub fn spawn(&mut self, particle: &Particle) -> BoxSimResult<BodyHandle> {
        let index = u32::try_from(self.bodies.len()).map_err(|_| {
            BoxSimError::InvalidParameters(format!(
                "Cannot spawn particle {}: body slots exhausted",
                particle.id
            ))
        })?;
        self.bodies.push(Some(Body {
            position: particle.position,
            velocity: particle.initial_velocity,
            sleeping: false,
            quiet_steps: 0,
        }));
        Ok(BodyHandle {
            index,
            epoch: self.epoch,
        })
    }

    /// Remove one body. Returns false if the handle was already stale.
    pub fn despawn(&mut self, handle: BodyHandle) -> bool {
        if handle.epoch != self.epoch {
            return false;
        }
        match self.bodies.get_mut(handle.index as usize) {
            Some(slot) => slot.take().is_some(),
            None => false,
        }
    }

    /// Advance every awake body by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        let limit = self.limit;
        for body in self.bodies.iter_mut().flatten() {
            if body.sleeping {
                continue;
            }

            for axis in 0..3 {
                body.velocity[axis] += self.gravity[axis] * dt;
                body.position[axis] += body.velocity[axis] * dt;
            }

            for axis in 0..3 {
                let hit = if body.position[axis] < -limit {
                    body.position[axis] = -limit;
                    true
                } else if body.position[axis] > limit {
                    body.position[axis] = limit;
                    true
                } else {
                    false
                };

                if hit {
                    body.velocity[axis] = -body.velocity[axis] * self.restitution;
                    if self.wall_friction {
                        for other in (0..3).filter(|&o| o != axis) {
                            body.velocity[other] *= WALL_FRICTION_KEEP;
                        }
                    }
                }
            }

            if length(body.velocity) < SLEEP_SPEED {
                body.quiet_steps += 1;
                if body.quiet_steps >= SLEEP_STEPS {
                    body.sleeping = true;
                    body.velocity = [0.0; 3];
                }
            } else {
                body.quiet_steps = 0;
            }
        }
    }

    /// Live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    pub fn velocities(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.bodies.iter().flatten().map(|b| b.velocity)
    }

    pub fn position(&self, handle: BodyHandle) -> BoxSimResult<Vec3> {
        self.body(handle).map(|b| b.position)
    }

    fn body(&self, handle: BodyHandle) -> BoxSimResult<&Body> {
        if handle.epoch != self.epoch {
            return Err(stale(handle, "handle belongs to an earlier reset"));
        }
        self.bodies
            .get(handle.index as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| stale(handle, "body was removed"))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> BoxSimResult<&mut Body> {
        if handle.epoch != self.epoch {
            return Err(stale(handle, "handle belongs to an earlier reset"));
        }
        self.bodies
            .get_mut(handle.index as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| stale(handle, "body was removed"))
    }
}

fn stale(handle: BodyHandle, reason: &str) -> BoxSimError {
    BoxSimError::BodyQuery {
        handle: handle.to_string(),
        reason: reason.to_string(),
    }
}

impl PhysicsEngine for BallisticBox {
    type Handle = BodyHandle;

    fn linear_velocity(&self, handle: BodyHandle) -> BoxSimResult<Vec3> {
        self.body(handle).map(|b| b.velocity)
    }

    fn set_linear_velocity(
        &mut self,
        handle: BodyHandle,
        velocity: Vec3,
        wake: bool,
    ) -> BoxSimResult<()> {
        let body = self.body_mut(handle)?;
        body.velocity = velocity;
        if wake {
            body.sleeping = false;
            body.quiet_steps = 0;
        }
        Ok(())
    }

    fn is_sleeping(&self, handle: BodyHandle) -> BoxSimResult<bool> {
        self.body(handle).map(|b| b.sleeping)
    }
}
