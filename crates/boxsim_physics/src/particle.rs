use boxsim_core::{BoxSimResult, Particle, SimulationConfig, Vec3, scale};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// RNG for one run: seeded when the config asks for reproducibility
pub fn run_rng(seed: Option<u64>) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

/// Generate the particle set for a fresh run.
///
/// Positions are uniform inside the container, inset by twice the radius from
/// every wall. Speeds are uniform in `[0.5, 1.0] * target_speed`.
pub fn generate_particles(
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> BoxSimResult<Vec<Particle>> {
    config.validate()?;

    let n = config.particle_count as usize;
    let half = config.half_size();
    let padding = config.particle_radius * 2.0;
    let lo = -half + padding;
    let hi = half - padding;

    let mut particles = Vec::with_capacity(n);
    for id in 0..config.particle_count {
        let position = [
            rng.gen_range(lo..hi),
            rng.gen_range(lo..hi),
            rng.gen_range(lo..hi),
        ];
        let speed = rng.gen_range(0.5..=1.0f32) * config.target_speed;
        let velocity = scale(random_direction(rng), speed);
        particles.push(Particle::new(id, position, velocity));
    }

    Ok(particles)
}

/// Unit vector from spherical coordinates.
///
/// The polar angle is drawn uniformly rather than cosine-weighted, so
/// directions bunch slightly towards the poles. Correction resampling reuses
/// this so recovered particles match the spawn distribution.
pub fn random_direction(rng: &mut impl Rng) -> Vec3 {
    let theta = rng.gen_range(0.0..std::f32::consts::TAU);
    let phi = rng.gen_range(0.0..std::f32::consts::PI);

    [phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()]
}
