//! Aggregate progress across a batch (entries settled, average pace, ETA).

use std::fmt;
use std::time::Duration;

/// Snapshot taken at an entry boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// Entries settled so far (any outcome).
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
    /// `elapsed / completed`; `None` before the first entry settles.
    pub avg_per_entry: Option<Duration>,
    /// `avg_per_entry * remaining`; zero once everything settled.
    pub eta: Option<Duration>,
}

impl ProgressSnapshot {
    pub fn new(completed: usize, total: usize, elapsed: Duration) -> Self {
        let completed = completed.min(total);
        let avg_per_entry = if completed == 0 {
            None
        } else {
            Some(elapsed / completed as u32)
        };
        let remaining = (total - completed) as u32;
        let eta = if remaining == 0 {
            Some(Duration::ZERO)
        } else {
            avg_per_entry.map(|avg| avg * remaining)
        };
        Self {
            completed,
            total,
            elapsed,
            avg_per_entry,
            eta,
        }
    }

    /// Fraction settled in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// `H:MM:SS`
pub fn format_hms(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.1}%) elapsed {} eta {}",
            self.completed,
            self.total,
            self.fraction() * 100.0,
            format_hms(self.elapsed),
            self.eta.map(format_hms).unwrap_or_else(|| "?".to_string())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eta_from_average() {
        let p = ProgressSnapshot::new(2, 10, Duration::from_secs(20));
        assert_eq!(p.avg_per_entry, Some(Duration::from_secs(10)));
        assert_eq!(p.eta, Some(Duration::from_secs(80)));
        assert!((p.fraction() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn eta_unknown_before_first_entry() {
        let p = ProgressSnapshot::new(0, 3, Duration::from_secs(1));
        assert_eq!(p.avg_per_entry, None);
        assert_eq!(p.eta, None);
        assert!(p.to_string().ends_with("eta ?"));
    }

    #[test]
    fn done_and_empty() {
        assert_eq!(ProgressSnapshot::new(3, 3, Duration::from_secs(9)).eta, Some(Duration::ZERO));
        assert_eq!(ProgressSnapshot::new(0, 0, Duration::ZERO).fraction(), 1.0);
    }

    #[test]
    fn display_format() {
        let p = ProgressSnapshot::new(1, 4, Duration::from_secs(3725));
        assert_eq!(p.to_string(), "1/4 (25.0%) elapsed 1:02:05 eta 3:06:15");
    }
}
