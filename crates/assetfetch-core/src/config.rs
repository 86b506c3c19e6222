use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::batch::{clamped_secs, DelayRange, MAX_PAUSE};
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per fetch or lookup (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 1.0 = 1s).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: clamped_secs(self.base_delay_secs),
            max_delay: Duration::from_secs(self.max_delay_secs),
            jitter: true,
        }
    }
}

/// Randomized pauses between entries and between sections, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Pause after an image within the same section.
    pub entry_delay_min_secs: f64,
    pub entry_delay_max_secs: f64,
    /// Pause after a video within the same section.
    #[serde(default = "default_video_delay_min")]
    pub video_delay_min_secs: f64,
    #[serde(default = "default_video_delay_max")]
    pub video_delay_max_secs: f64,
    pub section_delay_min_secs: f64,
    pub section_delay_max_secs: f64,
}

fn default_video_delay_min() -> f64 {
    2.0
}

fn default_video_delay_max() -> f64 {
    4.0
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            entry_delay_min_secs: 0.5,
            entry_delay_max_secs: 1.5,
            video_delay_min_secs: default_video_delay_min(),
            video_delay_max_secs: default_video_delay_max(),
            section_delay_min_secs: 1.0,
            section_delay_max_secs: 2.0,
        }
    }
}

impl PacingConfig {
    /// No pauses at all (tests, local mirrors).
    pub fn none() -> Self {
        Self {
            entry_delay_min_secs: 0.0,
            entry_delay_max_secs: 0.0,
            video_delay_min_secs: 0.0,
            video_delay_max_secs: 0.0,
            section_delay_min_secs: 0.0,
            section_delay_max_secs: 0.0,
        }
    }

    pub fn entry_delay(&self) -> DelayRange {
        DelayRange::from_secs(self.entry_delay_min_secs, self.entry_delay_max_secs)
    }

    pub fn video_delay(&self) -> DelayRange {
        DelayRange::from_secs(self.video_delay_min_secs, self.video_delay_max_secs)
    }

    pub fn section_delay(&self) -> DelayRange {
        DelayRange::from_secs(self.section_delay_min_secs, self.section_delay_max_secs)
    }

    fn delays(&self) -> [(&'static str, f64); 6] {
        [
            ("pacing.entry_delay_min_secs", self.entry_delay_min_secs),
            ("pacing.entry_delay_max_secs", self.entry_delay_max_secs),
            ("pacing.video_delay_min_secs", self.video_delay_min_secs),
            ("pacing.video_delay_max_secs", self.video_delay_max_secs),
            ("pacing.section_delay_min_secs", self.section_delay_min_secs),
            ("pacing.section_delay_max_secs", self.section_delay_max_secs),
        ]
    }
}

/// Per-call HTTP limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Whole-call timeout for metadata lookups (search API, HEAD).
    pub metadata_timeout_secs: u64,
    /// A media body transfer is aborted once throughput stays under 1 KiB/s this long.
    pub stall_timeout_secs: u64,
    /// Upper bound on the size of each chunk handed to the destination writer.
    pub chunk_size_bytes: usize,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            metadata_timeout_secs: 30,
            stall_timeout_secs: 60,
            chunk_size_bytes: 16 * 1024,
            user_agent: format!("assetfetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Placeholder canvas settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderConfig {
    pub width: u32,
    pub height: u32,
    /// Fixed line drawn near the bottom of every image placeholder.
    pub watermark: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            watermark: "Placeholder asset".to_string(),
        }
    }
}

/// Pexels search API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PexelsConfig {
    /// Environment variable holding the API key. The key itself is never stored in config.
    pub api_key_env: String,
    pub per_page: u32,
}

impl Default for PexelsConfig {
    fn default() -> Self {
        Self {
            api_key_env: "PEXELS_API_KEY".to_string(),
            per_page: 1,
        }
    }
}

/// Global configuration loaded from `~/.config/assetfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetFetchConfig {
    /// Fraction of the expected size above which an on-disk file counts as fully fetched.
    #[serde(default = "default_tolerance")]
    pub completeness_tolerance: f64,
    /// Carry rows of an existing sidecar into the rewritten one instead of starting fresh.
    #[serde(default)]
    pub merge_metadata: bool,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub pacing: Option<PacingConfig>,
    #[serde(default)]
    pub http: Option<HttpConfig>,
    #[serde(default)]
    pub placeholder: Option<PlaceholderConfig>,
    #[serde(default)]
    pub pexels: Option<PexelsConfig>,
}

fn default_tolerance() -> f64 {
    0.95
}

impl Default for AssetFetchConfig {
    fn default() -> Self {
        Self {
            completeness_tolerance: default_tolerance(),
            merge_metadata: false,
            retry: None,
            pacing: None,
            http: None,
            placeholder: None,
            pexels: None,
        }
    }
}

impl AssetFetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().policy()
    }

    pub fn pacing(&self) -> PacingConfig {
        self.pacing.clone().unwrap_or_default()
    }

    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    pub fn placeholder(&self) -> PlaceholderConfig {
        self.placeholder.clone().unwrap_or_default()
    }

    pub fn pexels(&self) -> PexelsConfig {
        self.pexels.clone().unwrap_or_default()
    }

    /// Reject delays longer than [`MAX_PAUSE`]. Conversions clamp regardless,
    /// so a config that skips this check still cannot panic.
    pub fn validate(&self) -> Result<()> {
        let max = MAX_PAUSE.as_secs_f64();
        let retry = self.retry.clone().unwrap_or_default();
        let mut delays = vec![
            ("retry.base_delay_secs", retry.base_delay_secs),
            ("retry.max_delay_secs", retry.max_delay_secs as f64),
        ];
        delays.extend(self.pacing().delays());
        for (name, secs) in delays {
            if !secs.is_finite() || secs > max {
                bail!("{name} = {secs} is out of range (at most {max} seconds)");
            }
        }
        Ok(())
    }

    /// Tolerance clamped to (0, 1].
    pub fn tolerance(&self) -> f64 {
        if self.completeness_tolerance.is_finite() && self.completeness_tolerance > 0.0 {
            self.completeness_tolerance.min(1.0)
        } else {
            1.0
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AssetFetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AssetFetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load the XDG config if one exists, otherwise defaults. Never writes.
pub fn load_or_default() -> Result<AssetFetchConfig> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetfetch")?;
    match xdg_dirs.find_config_file("config.toml") {
        Some(path) => load_from(&path),
        None => Ok(AssetFetchConfig::default()),
    }
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<AssetFetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: AssetFetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
