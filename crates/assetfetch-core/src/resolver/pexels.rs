//! Pexels photo/video search.

use super::{ResolveError, ResolvedSource, SourceResolver};
use crate::config::{AssetFetchConfig, HttpConfig};
use crate::http;
use crate::media::MediaKind;
use crate::retry::{run_with_retry, RetryPolicy};
use anyhow::Context;
use serde::Deserialize;

/// Video files narrower than this are only used when nothing wider exists.
const MIN_VIDEO_WIDTH: u32 = 1280;

#[derive(Debug, Deserialize)]
struct PhotoSearch {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    width: Option<u32>,
    height: Option<u32>,
    photographer: Option<String>,
    src: PhotoSrc,
}

#[derive(Debug, Deserialize)]
struct PhotoSrc {
    large: Option<String>,
    original: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoSearch {
    #[serde(default)]
    videos: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    user: Option<VideoUser>,
    #[serde(default)]
    video_files: Vec<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoUser {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    link: String,
    width: Option<u32>,
    height: Option<u32>,
}

fn license_line(author: Option<&str>) -> String {
    match author {
        Some(name) if !name.trim().is_empty() => format!("Pexels License (by {})", name.trim()),
        _ => "Pexels License".to_string(),
    }
}

/// First photo's `src.large` (falling back to `src.original`).
fn pick_photo(body: &str) -> Result<Option<ResolvedSource>, serde_json::Error> {
    let search: PhotoSearch = serde_json::from_str(body)?;
    Ok(search.photos.into_iter().find_map(|p| {
        let url = p.src.large.or(p.src.original)?;
        Some(ResolvedSource {
            url,
            license: Some(license_line(p.photographer.as_deref())),
            dimensions: p.width.zip(p.height),
        })
    }))
}

/// First video's first HD file, else its first file.
fn pick_video(body: &str) -> Result<Option<ResolvedSource>, serde_json::Error> {
    let search: VideoSearch = serde_json::from_str(body)?;
    Ok(search.videos.into_iter().find_map(|v| {
        let author = v.user.and_then(|u| u.name);
        let mut files = v.video_files.into_iter();
        let first = files.next()?;
        let file = if first.width.unwrap_or(0) >= MIN_VIDEO_WIDTH {
            first
        } else {
            files
                .find(|f| f.width.unwrap_or(0) >= MIN_VIDEO_WIDTH)
                .unwrap_or(first)
        };
        Some(ResolvedSource {
            url: file.link,
            license: Some(license_line(author.as_deref())),
            dimensions: file.width.zip(file.height),
        })
    }))
}

/// Resolver backed by the Pexels search API.
#[derive(Debug, Clone)]
pub struct PexelsResolver {
    api_key: String,
    base_url: String,
    per_page: u32,
    http: HttpConfig,
    policy: RetryPolicy,
}

impl PexelsResolver {
    pub const API_BASE: &'static str = "https://api.pexels.com";

    pub fn new(api_key: impl Into<String>, http: HttpConfig, policy: RetryPolicy) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::API_BASE.to_string(),
            per_page: 1,
            http,
            policy,
        }
    }

    /// Build from config, reading the key from the environment variable it names.
    pub fn from_config(cfg: &AssetFetchConfig) -> anyhow::Result<Self> {
        let pexels = cfg.pexels();
        let api_key = std::env::var(&pexels.api_key_env)
            .with_context(|| format!("environment variable {} not set", pexels.api_key_env))?;
        Ok(Self::new(api_key, cfg.http(), cfg.retry_policy()).with_per_page(pexels.per_page))
    }

    /// Point at a different host (mirrors, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    fn search_url(&self, keyword: &str, kind: MediaKind) -> Result<url::Url, ResolveError> {
        let path = match kind {
            MediaKind::Image => "v1/search",
            MediaKind::Video => "videos/search",
        };
        let mut url = url::Url::parse(&format!("{}/{}", self.base_url, path))?;
        url.query_pairs_mut()
            .append_pair("query", keyword)
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("orientation", "landscape");
        Ok(url)
    }

    fn lookup(&self, keyword: &str, kind: MediaKind) -> Result<Option<ResolvedSource>, ResolveError> {
        let url = self.search_url(keyword, kind)?;
        let response = http::get_text(
            url.as_str(),
            &[("Authorization", self.api_key.as_str())],
            &self.http,
        )?;
        if response.status != 200 {
            return Err(ResolveError::Http {
                status: response.status,
            });
        }
        let picked = match kind {
            MediaKind::Image => pick_photo(&response.body)?,
            MediaKind::Video => pick_video(&response.body)?,
        };
        Ok(picked)
    }
}

impl SourceResolver for PexelsResolver {
    fn resolve(&self, keyword: &str, kind: MediaKind) -> Option<ResolvedSource> {
        match run_with_retry(&self.policy, keyword, |_| self.lookup(keyword, kind)) {
            Ok(Some(source)) => {
                tracing::debug!(keyword, %kind, url = %source.url, "resolved");
                Some(source)
            }
            Ok(None) => {
                tracing::info!(keyword, %kind, "no search results");
                None
            }
            Err(e) => {
                tracing::warn!(keyword, %kind, error = %e, "search failed");
                None
            }
        }
    }
}
