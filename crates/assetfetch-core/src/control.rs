//! Run control: a shared stop token checked by the batch runner between entries.
//!
//! The token never interrupts an entry that is already in flight; the runner
//! finishes it, sees the flag at the next boundary and stops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Error-like marker returned when a run is stopped before every entry was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStopped;

impl std::fmt::Display for RunStopped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run stopped by request")
    }
}

impl std::error::Error for RunStopped {}

/// Cloneable stop token. Clones share one flag.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    stop: Arc<AtomicBool>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop at the next entry boundary.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// `Err(RunStopped)` once a stop was requested.
    pub fn check(&self) -> Result<(), RunStopped> {
        if self.is_stop_requested() {
            Err(RunStopped)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let control = RunControl::new();
        let handle = control.clone();
        assert!(control.check().is_ok());
        handle.request_stop();
        assert!(control.is_stop_requested());
        assert_eq!(control.check(), Err(RunStopped));
    }
}
