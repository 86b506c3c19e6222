//! Per-entry outcomes and the run summary.

use crate::retry::FailureClass;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Where an entry is in the per-entry state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPhase {
    Pending,
    Resolving,
    Fetching,
    Placeholder,
    Complete,
    Failed,
}

/// Terminal state of one entry in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Complete via fetch.
    Fetched { bytes: u64, resumed_from: u64 },
    /// Complete via placeholder; `cause` is why no fetched copy exists.
    Placeholder { cause: FailureClass, degraded: bool },
    /// The destination already passed the completeness check; nothing was done.
    AlreadyPresent { bytes: u64 },
    /// Local I/O failure. The batch continues.
    Failed { class: FailureClass, reason: String },
}

impl EntryOutcome {
    pub fn phase(&self) -> EntryPhase {
        match self {
            EntryOutcome::Failed { .. } => EntryPhase::Failed,
            _ => EntryPhase::Complete,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntryOutcome::Fetched { .. } => "fetched",
            EntryOutcome::Placeholder { .. } => "placeholder",
            EntryOutcome::AlreadyPresent { .. } => "present",
            EntryOutcome::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for EntryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryOutcome::Fetched { bytes, resumed_from: 0 } => write!(f, "fetched {bytes} bytes"),
            EntryOutcome::Fetched { bytes, resumed_from } => {
                write!(f, "fetched {bytes} bytes (resumed at {resumed_from})")
            }
            EntryOutcome::Placeholder { cause, degraded } => {
                write!(f, "placeholder ({cause})")?;
                if *degraded {
                    write!(f, " [text stand-in]")?;
                }
                Ok(())
            }
            EntryOutcome::AlreadyPresent { bytes } => write!(f, "already present ({bytes} bytes)"),
            EntryOutcome::Failed { class, reason } => write!(f, "failed ({class}): {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub destination: PathBuf,
    pub outcome: EntryOutcome,
}

/// Counts per terminal state. On a fresh run `fetched + placeholder + failed`
/// equals `total`; re-runs add `already_present`, a stopped run `not_attempted`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub fetched: usize,
    pub placeholder: usize,
    pub failed: usize,
    pub already_present: usize,
    pub not_attempted: usize,
    /// Sidecar tables that could not be written (assets themselves are unaffected).
    pub sidecar_failures: usize,
    pub elapsed: Duration,
    pub reports: Vec<EntryReport>,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, destination: PathBuf, outcome: EntryOutcome) {
        match &outcome {
            EntryOutcome::Fetched { .. } => self.fetched += 1,
            EntryOutcome::Placeholder { .. } => self.placeholder += 1,
            EntryOutcome::AlreadyPresent { .. } => self.already_present += 1,
            EntryOutcome::Failed { .. } => self.failed += 1,
        }
        self.reports.push(EntryReport {
            destination,
            outcome,
        });
    }

    /// Entries that reached a terminal state.
    pub fn settled(&self) -> usize {
        self.fetched + self.placeholder + self.failed + self.already_present
    }

    pub fn is_consistent(&self) -> bool {
        self.settled() + self.not_attempted == self.total
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<16} {:>6}", "fetched", self.fetched)?;
        writeln!(f, "{:<16} {:>6}", "placeholder", self.placeholder)?;
        writeln!(f, "{:<16} {:>6}", "failed", self.failed)?;
        writeln!(f, "{:<16} {:>6}", "already present", self.already_present)?;
        if self.not_attempted > 0 {
            writeln!(f, "{:<16} {:>6}", "not attempted", self.not_attempted)?;
        }
        write!(f, "{:<16} {:>6}", "total", self.total)
    }
}
