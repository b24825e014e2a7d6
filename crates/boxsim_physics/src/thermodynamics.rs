use boxsim_core::{Vec3, is_finite, length};

/// Kinetic summary of the live bodies
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KineticStats {
    pub mean_speed: f64,
    /// Sum of 0.5 * v^2 over all bodies (unit mass)
    pub kinetic_energy: f64,
    /// Bodies left out because their velocity was not finite
    pub non_finite: usize,
}

/// Summarise a set of velocities. Non-finite vectors are counted, not summed.
pub fn kinetic_stats(velocities: impl IntoIterator<Item = Vec3>) -> KineticStats {
    let mut stats = KineticStats::default();
    let mut counted = 0usize;
    let mut speed_sum = 0.0f64;

    for v in velocities {
        if !is_finite(v) {
            stats.non_finite += 1;
            continue;
        }
        let speed = length(v) as f64;
        speed_sum += speed;
        stats.kinetic_energy += 0.5 * speed * speed;
        counted += 1;
    }

    if counted > 0 {
        stats.mean_speed = speed_sum / counted as f64;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        let stats = kinetic_stats(Vec::new());
        assert_eq!(stats, KineticStats::default());
    }

    #[test]
    fn test_mean_speed_and_energy() {
        let stats = kinetic_stats(vec![[3.0, 4.0, 0.0], [1.0, 0.0, 0.0]]);
        assert!((stats.mean_speed - 3.0).abs() < 1e-9);
        assert!((stats.kinetic_energy - 13.0).abs() < 1e-6);
        assert_eq!(stats.non_finite, 0);
    }

    #[test]
    fn test_non_finite_skipped() {
        let stats = kinetic_stats(vec![[f32::NAN, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        assert_eq!(stats.non_finite, 1);
        assert!((stats.mean_speed - 2.0).abs() < 1e-9);
    }
}
