//! Media kind shared by the fetcher, the synthesizer and the catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Closed set of asset kinds the engine knows how to fetch and synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[serde(alias = "images")]
    Image,
    #[serde(alias = "videos")]
    Video,
}

impl MediaKind {
    /// Derive the kind from a destination path's extension. Only called at catalog load time.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" => Some(MediaKind::Image),
            "mp4" | "mov" | "webm" | "m4v" => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// Default file extension for generated file names.
    pub fn default_extension(self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }

    /// Directory name used under a section (`images` / `videos`).
    pub fn dir_name(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(MediaKind::from_path(Path::new("a/b.JPG")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path(Path::new("logo.png")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path(Path::new("clip.mp4")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaKind::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn serde_accepts_plural_directory_names() {
        #[derive(Deserialize)]
        struct W {
            media: MediaKind,
        }
        let w: W = toml::from_str("media = \"videos\"").unwrap();
        assert_eq!(w.media, MediaKind::Video);
        let w: W = toml::from_str("media = \"image\"").unwrap();
        assert_eq!(w.media, MediaKind::Image);
    }
}
