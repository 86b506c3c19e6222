//! Randomized pauses between entries and between sections.

use rand::Rng;
use std::time::Duration;

/// Longest pause any configured delay is allowed to produce.
pub const MAX_PAUSE: Duration = Duration::from_secs(24 * 60 * 60);

/// Seconds to a `Duration`: negative or non-finite becomes 0, anything past
/// `MAX_PAUSE` (including values `Duration` cannot hold) becomes `MAX_PAUSE`.
pub fn clamped_secs(secs: f64) -> Duration {
    if !(secs.is_finite() && secs > 0.0) {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).map_or(MAX_PAUSE, |d| d.min(MAX_PAUSE))
}

/// Closed range a pause is drawn from uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    /// Bounds are cleaned with [`clamped_secs`]; swapped bounds are reordered.
    pub fn from_secs(min: f64, max: f64) -> Self {
        let (a, b) = (clamped_secs(min), clamped_secs(max));
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn zero() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    pub fn sample_with<G: Rng + ?Sized>(&self, rng: &mut G) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        let span = (self.max - self.min).as_millis() as u64;
        self.min + Duration::from_millis(rng.gen_range(0..=span))
    }

    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Sleep for a sampled duration; returns how long.
    pub fn pause(&self) -> Duration {
        let d = self.sample();
        if !d.is_zero() {
            std::thread::sleep(d);
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_range() {
        let range = DelayRange::from_secs(0.5, 1.5);
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let d = range.sample_with(&mut rng);
            assert!(d >= Duration::from_millis(500) && d <= Duration::from_millis(1500), "{d:?}");
        }
    }

    #[test]
    fn bad_bounds_are_cleaned() {
        let r = DelayRange::from_secs(2.0, 1.0);
        assert_eq!(r.min, Duration::from_secs(1));
        assert_eq!(r.max, Duration::from_secs(2));
        let r = DelayRange::from_secs(-1.0, f64::NAN);
        assert!(r.is_zero());
        assert_eq!(r.pause(), Duration::ZERO);
    }

    #[test]
    fn huge_bounds_are_capped() {
        let r = DelayRange::from_secs(1e300, f64::MAX);
        assert_eq!(r.min, MAX_PAUSE);
        assert_eq!(r.max, MAX_PAUSE);
        assert_eq!(clamped_secs(90_000.0), MAX_PAUSE);
        assert_eq!(clamped_secs(2.5), Duration::from_millis(2500));
    }
}
