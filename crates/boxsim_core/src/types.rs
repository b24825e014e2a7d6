use serde::{Deserialize, Serialize};

/// Engine-space vector (x, y, z)
pub type Vec3 = [f32; 3];

/// Stable identifier of a particle within one generation
pub type ParticleId = u32;

/// Initial record of one particle. Immutable once generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub position: Vec3,
    pub initial_velocity: Vec3,
}

impl Particle {
    pub fn new(id: ParticleId, position: Vec3, initial_velocity: Vec3) -> Self {
        Self {
            id,
            position,
            initial_velocity,
        }
    }

    pub fn initial_speed(&self) -> f32 {
        length(self.initial_velocity)
    }
}

/// Euclidean norm
pub fn length(v: Vec3) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub fn scale(v: Vec3, factor: f32) -> Vec3 {
    [v[0] * factor, v[1] * factor, v[2] * factor]
}

/// True when every component is neither NaN nor infinite
pub fn is_finite(v: Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_scale() {
        let v = [3.0, 4.0, 0.0];
        assert!((length(v) - 5.0).abs() < 1e-6);
        assert_eq!(scale(v, 2.0), [6.0, 8.0, 0.0]);
    }

    #[test]
    fn test_is_finite() {
        assert!(is_finite([1.0, -2.0, 0.0]));
        assert!(!is_finite([f32::NAN, 0.0, 0.0]));
        assert!(!is_finite([0.0, f32::NEG_INFINITY, 0.0]));
    }

    #[test]
    fn test_initial_speed() {
        let p = Particle::new(7, [0.0; 3], [0.0, 0.6, 0.8]);
        assert!((p.initial_speed() - 1.0).abs() < 1e-6);
    }
}
