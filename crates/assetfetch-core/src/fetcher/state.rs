//! Transient per-entry fetch bookkeeping.

/// Lifecycle of one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Pending,
    InProgress,
    Complete,
    Failed,
}

/// Progress of the current fetch of one entry. Never persisted: after a restart
/// it is rebuilt from the length of the file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchState {
    pub bytes_expected: Option<u64>,
    pub bytes_written: u64,
    pub attempt: u32,
    pub status: FetchStatus,
    /// Full rewrites from offset 0 seen so far (range fallback).
    pub restarts: u32,
}

impl FetchState {
    pub fn new() -> Self {
        Self {
            bytes_expected: None,
            bytes_written: 0,
            attempt: 0,
            status: FetchStatus::Pending,
            restarts: 0,
        }
    }

    /// Start a new attempt from whatever is already on disk.
    pub fn begin_attempt(&mut self, attempt: u32, on_disk: u64) {
        self.attempt = attempt;
        self.bytes_written = on_disk;
        self.status = FetchStatus::InProgress;
    }

    /// Record a progress report. Within one transfer reports only grow; a smaller
    /// value means the fetcher discarded the partial file and restarted at offset 0.
    pub fn observe(&mut self, bytes_so_far: u64, total: Option<u64>) {
        if bytes_so_far < self.bytes_written {
            self.restarts += 1;
        }
        self.bytes_written = bytes_so_far;
        if total.is_some() {
            self.bytes_expected = total;
        }
    }

    pub fn finish(&mut self, ok: bool) {
        self.status = if ok {
            FetchStatus::Complete
        } else {
            FetchStatus::Failed
        };
    }

    /// Percentage when the total is known.
    pub fn percent(&self) -> Option<f64> {
        match self.bytes_expected {
            Some(0) | None => None,
            Some(t) => Some((self.bytes_written as f64 / t as f64 * 100.0).min(100.0)),
        }
    }
}

impl Default for FetchState {
    fn default() -> Self {
        Self::new()
    }
}
