//! Range-aware single-file fetcher.
//!
//! `fetch` resumes from the current length of the destination file with a
//! `Range: bytes=N-` request. A partial response for the right offset is
//! appended; a full response (range ignored) is written from offset 0 in the
//! same transfer; a 416 or a partial response for the wrong offset triggers a
//! fresh unconditional GET that truncates the file first. Retrying is the
//! caller's decision (`fetch_with_retry` wraps the shared policy).

mod error;
mod state;
mod transfer;

pub use error::FetchError;
pub use state::{FetchState, FetchStatus};

use crate::config::{AssetFetchConfig, HttpConfig};
use crate::media::MediaKind;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::storage::{self, DestinationWriter};
use std::path::Path;
use transfer::{transfer, Report, TransferEnd};

/// Result of a fetch that left a complete file at the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Final length of the destination file.
    pub bytes_on_disk: u64,
    /// Bytes received by this call.
    pub bytes_transferred: u64,
    /// Resource size if the server reported one.
    pub total: Option<u64>,
    /// Offset the transfer resumed from (0 for a full download).
    pub resumed_from: u64,
    /// The partial file was discarded because the server could not honor the range.
    pub restarted_from_zero: bool,
}

#[derive(Debug, Clone)]
pub struct RangeAwareFetcher {
    http: HttpConfig,
    tolerance: f64,
}

impl RangeAwareFetcher {
    /// `tolerance` is the completeness threshold applied when a 416 reports the full size.
    pub fn new(http: HttpConfig, tolerance: f64) -> Self {
        Self { http, tolerance }
    }

    pub fn from_config(cfg: &AssetFetchConfig) -> Self {
        Self::new(cfg.http(), cfg.tolerance())
    }

    /// Fetch `url` into `destination`, resuming from the file's current length.
    ///
    /// `progress` is called after every chunk is on disk with
    /// `(bytes in file, total if known)`; it runs inline on the transfer thread.
    pub fn fetch(
        &self,
        url: &str,
        destination: &Path,
        kind: MediaKind,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<FetchOutcome, FetchError> {
        validate_url(url)?;
        storage::ensure_parent_dir(destination)
            .map_err(|e| FetchError::local_io(destination, e))?;
        let offset = storage::existing_len(destination)
            .map_err(|e| FetchError::local_io(destination, e))?;

        if offset > 0 {
            tracing::debug!(destination = %destination.display(), offset, %kind, "resuming");
        }

        match transfer(url, destination, offset, kind, &self.http, progress)? {
            TransferEnd::Done(report) => Ok(outcome(report, offset > 0 && report.offset == 0)),
            TransferEnd::RangeNotHonored { got_start } => {
                tracing::warn!(
                    destination = %destination.display(),
                    requested = offset,
                    got_start = ?got_start,
                    "partial response for a different offset; re-fetching from 0"
                );
                self.refetch_from_zero(url, destination, kind, progress)
            }
            TransferEnd::Unsatisfiable { total } => {
                if let Some(total) = total {
                    if offset <= total && storage::is_complete(offset, Some(total), self.tolerance)
                    {
                        tracing::debug!(
                            destination = %destination.display(),
                            offset,
                            total,
                            "range not satisfiable but file already complete"
                        );
                        return Ok(FetchOutcome {
                            bytes_on_disk: offset,
                            bytes_transferred: 0,
                            total: Some(total),
                            resumed_from: offset,
                            restarted_from_zero: false,
                        });
                    }
                }
                tracing::warn!(
                    destination = %destination.display(),
                    offset,
                    total = ?total,
                    "range not satisfiable; re-fetching from 0"
                );
                self.refetch_from_zero(url, destination, kind, progress)
            }
        }
    }

    /// Truncate the destination and GET the whole resource without a range header.
    fn refetch_from_zero(
        &self,
        url: &str,
        destination: &Path,
        kind: MediaKind,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<FetchOutcome, FetchError> {
        DestinationWriter::create_truncate(destination)
            .map_err(|e| FetchError::local_io(destination, e))?;
        match transfer(url, destination, 0, kind, &self.http, progress)? {
            TransferEnd::Done(report) => Ok(outcome(report, true)),
            TransferEnd::RangeNotHonored { got_start } => Err(FetchError::RangeUnsupported(
                format!("unrequested partial response starting at {:?}", got_start),
            )),
            TransferEnd::Unsatisfiable { .. } => Err(FetchError::RangeUnsupported(
                "416 without a range request".to_string(),
            )),
        }
    }

    /// `fetch` under the shared retry policy. `state` tracks the current attempt
    /// and `on_progress` sees it after every chunk.
    pub fn fetch_with_retry(
        &self,
        policy: &RetryPolicy,
        url: &str,
        destination: &Path,
        kind: MediaKind,
        state: &mut FetchState,
        on_progress: &mut dyn FnMut(&FetchState),
    ) -> Result<FetchOutcome, FetchError> {
        let result = run_with_retry(policy, url, |attempt| {
            let on_disk = storage::existing_len(destination).unwrap_or(0);
            state.begin_attempt(attempt, on_disk);
            self.fetch(url, destination, kind, &mut |bytes, total| {
                state.observe(bytes, total);
                on_progress(&*state);
            })
        });
        state.finish(result.is_ok());
        result
    }
}

fn outcome(report: Report, restarted_from_zero: bool) -> FetchOutcome {
    FetchOutcome {
        bytes_on_disk: report.file_len,
        bytes_transferred: report.written,
        total: report.total,
        resumed_from: report.offset,
        restarted_from_zero,
    }
}

/// Absolute http(s) URL check.
pub fn validate_url(raw: &str) -> Result<(), FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = url::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other}"))),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}
