use std::collections::HashSet;
use std::hash::Hash;

/// Lets each distinct issue through once per generation.
///
/// Owned by a monitor instance and cleared on reset, so a new run reports
/// its own issues afresh.
#[derive(Debug, Clone)]
pub struct LogThrottle<K> {
    seen: HashSet<K>,
    suppressed: u64,
}

impl<K: Eq + Hash> Default for LogThrottle<K> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            suppressed: 0,
        }
    }
}

impl<K: Eq + Hash> LogThrottle<K> {
    /// True the first time `key` is offered since the last clear
    pub fn should_log(&mut self, key: K) -> bool {
        if self.seen.insert(key) {
            true
        } else {
            self.suppressed += 1;
            false
        }
    }

    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.suppressed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_only() {
        let mut throttle = LogThrottle::default();
        assert!(throttle.should_log((1u32, "stalled")));
        assert!(!throttle.should_log((1u32, "stalled")));
        assert!(throttle.should_log((1u32, "invalid")));
        assert!(throttle.should_log((2u32, "stalled")));
        assert_eq!(throttle.suppressed(), 1);
    }

    #[test]
    fn test_clear_forgets() {
        let mut throttle = LogThrottle::default();
        assert!(throttle.should_log(5u32));
        throttle.clear();
        assert_eq!(throttle.suppressed(), 0);
        assert!(throttle.should_log(5u32));
    }
}
