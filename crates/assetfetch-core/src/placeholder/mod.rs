//! Deterministic substitute assets for entries with no usable source.
//!
//! Images go through [`layout::compose`] and a [`Renderer`]; without one (the
//! `render` feature off, or the backend failing) a textual stand-in is written
//! instead and the result is flagged `degraded`. Videos are always the
//! minimal MP4 from [`video::minimal_mp4`].

#[cfg(feature = "render")]
mod font;
pub mod layout;
#[cfg(feature = "render")]
mod render;
pub mod video;

#[cfg(feature = "render")]
pub use render::RasterRenderer;

use crate::config::PlaceholderConfig;
use crate::media::MediaKind;
use crate::storage;
use layout::CanvasLayout;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Output encoding requested from a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Jpeg,
    Png,
}

impl ImageEncoding {
    /// PNG for `.png`, JPEG for everything else.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => ImageEncoding::Png,
            _ => ImageEncoding::Jpeg,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("render backend: {0}")]
    Backend(String),
}

/// Paints a layout into encoded image bytes.
pub trait Renderer {
    fn render(&self, layout: &CanvasLayout, encoding: ImageEncoding) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("placeholder {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What was written for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesized {
    pub bytes: u64,
    pub dimensions: Option<(u32, u32)>,
    /// The rendering backend was unavailable and a textual stand-in was written.
    pub degraded: bool,
}

pub struct PlaceholderSynthesizer {
    renderer: Option<Box<dyn Renderer>>,
    cfg: PlaceholderConfig,
}

impl std::fmt::Debug for PlaceholderSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderSynthesizer")
            .field("renderer", &self.renderer.is_some())
            .field("cfg", &self.cfg)
            .finish()
    }
}

impl PlaceholderSynthesizer {
    pub fn new(renderer: Option<Box<dyn Renderer>>, cfg: PlaceholderConfig) -> Self {
        Self { renderer, cfg }
    }

    /// Synthesizer with the built-in raster backend when compiled in.
    pub fn from_config(cfg: PlaceholderConfig) -> Self {
        #[cfg(feature = "render")]
        let renderer: Option<Box<dyn Renderer>> = Some(Box::new(RasterRenderer));
        #[cfg(not(feature = "render"))]
        let renderer: Option<Box<dyn Renderer>> = None;
        Self::new(renderer, cfg)
    }

    pub fn without_renderer(cfg: PlaceholderConfig) -> Self {
        Self::new(None, cfg)
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Write a placeholder for `kind` at `destination`.
    ///
    /// Bytes go to `<destination>.part` first and are renamed into place, so a
    /// crash never leaves a truncated file under the final name.
    pub fn synthesize(
        &self,
        destination: &Path,
        kind: MediaKind,
        title: &str,
    ) -> Result<Synthesized, SynthesisError> {
        let io_err = |source| SynthesisError::LocalIo {
            path: destination.to_path_buf(),
            source,
        };
        let (data, dimensions, degraded) = match kind {
            MediaKind::Video => (video::minimal_mp4(), None, false),
            MediaKind::Image => self.image_bytes(destination, title),
        };

        storage::ensure_parent_dir(destination).map_err(io_err)?;
        let staging = storage::part_path(destination);
        fs::write(&staging, &data).map_err(io_err)?;
        storage::finalize(&staging, destination).map_err(io_err)?;

        tracing::debug!(
            destination = %destination.display(),
            %kind,
            bytes = data.len(),
            degraded,
            "placeholder written"
        );
        Ok(Synthesized {
            bytes: data.len() as u64,
            dimensions,
            degraded,
        })
    }

    fn image_bytes(&self, destination: &Path, title: &str) -> (Vec<u8>, Option<(u32, u32)>, bool) {
        let (w, h) = (self.cfg.width.max(1), self.cfg.height.max(1));
        if let Some(renderer) = &self.renderer {
            let layout = layout::compose(title, &self.cfg.watermark, w, h);
            match renderer.render(&layout, ImageEncoding::from_path(destination)) {
                Ok(bytes) if !bytes.is_empty() => return (bytes, Some((w, h)), false),
                Ok(_) => tracing::warn!(destination = %destination.display(), "renderer produced no bytes"),
                Err(e) => tracing::warn!(destination = %destination.display(), error = %e, "render failed"),
            }
        }
        (self.text_stand_in(title, w, h), None, true)
    }

    fn text_stand_in(&self, title: &str, w: u32, h: u32) -> Vec<u8> {
        format!(
            "PLACEHOLDER IMAGE\ntitle: {}\nsize: {}x{}\n{}\n",
            if title.trim().is_empty() { "untitled" } else { title.trim() },
            w,
            h,
            self.cfg.watermark
        )
        .into_bytes()
    }
}
