//! Failure taxonomy surfaced to the batch runner.

use std::fmt;

/// Where a failed entry's error came from; drives the runner's transition choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The resolver found nothing. Not an error: use a placeholder.
    ResolutionEmpty,
    /// Timeout, connection reset, 5xx. Retried, then placeholder.
    TransientNetwork,
    /// 4xx other than 416. Not retried, straight to placeholder.
    PermanentRemote,
    /// Server ignored or rejected the range request; full re-fetch.
    RangeUnsupported,
    /// Destination could not be written. The entry fails; the batch continues.
    LocalIo,
}

impl FailureClass {
    /// Whether the runner may substitute a placeholder for this failure.
    pub fn is_remote(self) -> bool {
        !matches!(self, FailureClass::LocalIo)
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureClass::ResolutionEmpty => "resolution-empty",
            FailureClass::TransientNetwork => "transient-network",
            FailureClass::PermanentRemote => "permanent-remote",
            FailureClass::RangeUnsupported => "range-unsupported",
            FailureClass::LocalIo => "local-io",
        };
        f.write_str(s)
    }
}
