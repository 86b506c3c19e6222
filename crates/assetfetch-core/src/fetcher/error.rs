//! Fetch error type and its mapping onto retry kinds and failure classes.

use crate::retry::{classify_curl_error, classify_http_status, Classify, ErrorKind, FailureClass};
use std::io;
use std::path::PathBuf;

/// Error returned by a single fetch call.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Curl reported an error (timeout, connection, etc.).
    #[error("transport: {0}")]
    Transport(#[source] curl::Error),
    /// Response status outside {200, 206} (416 is handled before this surfaces).
    #[error("HTTP {status}")]
    Http { status: u32 },
    /// Transfer ended before the advertised size reached disk. The next attempt resumes.
    #[error("short transfer: {received} of {expected} bytes on disk")]
    ShortTransfer { expected: u64, received: u64 },
    /// 2xx response with nothing in it.
    #[error("empty response body")]
    EmptyBody,
    /// Server answered a media request with a document (error page, JSON).
    #[error("expected {expected} content, got {content_type}")]
    ContentType {
        expected: crate::media::MediaKind,
        content_type: String,
    },
    /// Even the unconditional re-fetch came back as a mismatched partial response.
    #[error("range not honored: {0}")]
    RangeUnsupported(String),
    /// Disk/storage failure (permission denied, disk full). Not retried.
    #[error("destination {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub fn local_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FetchError::LocalIo {
            path: path.into(),
            source,
        }
    }

    pub fn class(&self) -> FailureClass {
        match self {
            FetchError::LocalIo { .. } => FailureClass::LocalIo,
            FetchError::RangeUnsupported(_) => FailureClass::RangeUnsupported,
            other if other.error_kind().is_retryable() => FailureClass::TransientNetwork,
            _ => FailureClass::PermanentRemote,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.error_kind().is_retryable()
    }
}

impl Classify for FetchError {
    fn error_kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport(e) => classify_curl_error(e),
            FetchError::Http { status } => classify_http_status(*status),
            FetchError::ShortTransfer { .. } => ErrorKind::ShortTransfer,
            FetchError::InvalidUrl { .. }
            | FetchError::EmptyBody
            | FetchError::ContentType { .. }
            | FetchError::RangeUnsupported(_)
            | FetchError::LocalIo { .. } => ErrorKind::Other,
        }
    }
}
