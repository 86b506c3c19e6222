//! Batch engine: drives a catalog through resolve, fetch and placeholder steps.

mod metadata;
mod outcome;
mod pacing;
mod progress;
mod runner;

pub use metadata::{
    read_table, AssetRecord, RecordSource, SidecarError, SidecarSet, PLACEHOLDER_LICENSE,
    SIDECAR_FILE_NAME, UNVERIFIED_LICENSE,
};
pub use outcome::{BatchSummary, EntryOutcome, EntryPhase, EntryReport};
pub use pacing::{clamped_secs, DelayRange, MAX_PAUSE};
pub use progress::{format_hms, ProgressSnapshot};
pub use runner::{BatchObserver, BatchRunner, NoopObserver};
