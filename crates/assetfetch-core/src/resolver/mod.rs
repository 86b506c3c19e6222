//! Resolver interface for turning a semantic request into a direct URL.
//!
//! The batch runner only depends on this trait and does not know about any
//! specific search API.

mod pexels;

pub use pexels::PexelsResolver;

use crate::media::MediaKind;
use crate::retry::{classify_curl_error, classify_http_status, Classify, ErrorKind};

/// A concrete source for one asset, plus whatever the search API told us about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub url: String,
    /// Licence/attribution line for the sidecar record.
    pub license: Option<String>,
    /// Pixel dimensions, if known.
    pub dimensions: Option<(u32, u32)>,
}

impl ResolvedSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            license: None,
            dimensions: None,
        }
    }
}

/// Turns (keyword, kind) into a source URL. Nothing found is `None`, never an error;
/// implementations absorb their own transient failures.
pub trait SourceResolver {
    fn resolve(&self, keyword: &str, kind: MediaKind) -> Option<ResolvedSource>;
}

impl<R: SourceResolver + ?Sized> SourceResolver for Box<R> {
    fn resolve(&self, keyword: &str, kind: MediaKind) -> Option<ResolvedSource> {
        (**self).resolve(keyword, kind)
    }
}

impl<R: SourceResolver + ?Sized> SourceResolver for &R {
    fn resolve(&self, keyword: &str, kind: MediaKind) -> Option<ResolvedSource> {
        (**self).resolve(keyword, kind)
    }
}

/// Resolver for runs without network search: every lookup is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineResolver;

impl SourceResolver for OfflineResolver {
    fn resolve(&self, _keyword: &str, _kind: MediaKind) -> Option<ResolvedSource> {
        None
    }
}

/// Failure of one search call.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    #[error("search API returned HTTP {status}")]
    Http { status: u32 },
    #[error("malformed search response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("bad search URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Classify for ResolveError {
    fn error_kind(&self) -> ErrorKind {
        match self {
            ResolveError::Transport(e) => classify_curl_error(e),
            ResolveError::Http { status } => classify_http_status(*status),
            ResolveError::Parse(_) | ResolveError::Url(_) => ErrorKind::Other,
        }
    }
}
