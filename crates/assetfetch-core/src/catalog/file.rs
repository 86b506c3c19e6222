//! TOML catalog file: `[[section]]` blocks expanded into numbered entries plus explicit `[[asset]]` entries.
//!
//! ```toml
//! root = "assets"
//!
//! [[section]]
//! page = "home"
//! section = "hero"
//! keyword = "modern office"
//! media = "images"
//! count = 3
//! urls = ["https://images.example.com/office.jpg"]
//!
//! [[asset]]
//! path = "brand/logo.png"
//! keyword = "logo"
//! ```

use super::naming::{asset_filename, default_title, slug};
use super::{AssetCatalogEntry, Catalog, CatalogError};
use crate::media::MediaKind;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

fn default_count() -> u32 {
    1
}

/// A run of `count` assets for one page section and keyword.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionBlock {
    pub page: String,
    pub section: String,
    pub keyword: String,
    pub media: MediaKind,
    #[serde(default = "default_count")]
    pub count: u32,
    /// Direct URLs for the first entries of the block, in order.
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub expected_bytes: Option<u64>,
}

/// One explicitly placed asset; its kind comes from the path's extension.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetBlock {
    pub path: PathBuf,
    pub keyword: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub expected_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    /// Output root; relative roots are resolved against the catalog file's directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default, rename = "section")]
    pub sections: Vec<SectionBlock>,
    #[serde(default, rename = "asset")]
    pub assets: Vec<AssetBlock>,
}

impl CatalogFile {
    pub fn parse(text: &str, origin: &Path) -> Result<Self, CatalogError> {
        toml::from_str(text).map_err(|source| CatalogError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Expand into a validated catalog rooted at `root`.
    /// Sections come first, in file order, then explicit assets.
    pub fn into_catalog(self, root: &Path) -> Result<Catalog, CatalogError> {
        let mut entries = Vec::new();
        for block in self.sections {
            let dir = root
                .join(slug(&block.page))
                .join(slug(&block.section))
                .join(block.media.dir_name());
            for i in 0..block.count {
                let sequence = i + 1;
                let name = asset_filename(&block.page, &block.section, &block.keyword, sequence, block.media);
                entries.push(AssetCatalogEntry {
                    destination_path: dir.join(name),
                    section_id: block.section.clone(),
                    keyword: block.keyword.clone(),
                    media_kind: block.media,
                    desired_count: block.count,
                    source_url: block.urls.get(i as usize).cloned(),
                    title: Some(default_title(&block.keyword, sequence)),
                    expected_bytes: block.expected_bytes,
                    page: Some(block.page.clone()),
                });
            }
        }
        for asset in self.assets {
            let path = if asset.path.is_absolute() {
                asset.path
            } else {
                root.join(asset.path)
            };
            let mut entry = AssetCatalogEntry::new(
                path,
                asset.section.unwrap_or_else(|| "misc".to_string()),
                asset.keyword,
            )?;
            entry.source_url = asset.url;
            entry.title = asset.title;
            entry.expected_bytes = asset.expected_bytes;
            entry.page = asset.page;
            entries.push(entry);
        }
        Catalog::new(entries)
    }

    /// `override_root`, else the file's `root` (relative to `base_dir`), else `base_dir`.
    pub fn resolve_root(&self, base_dir: &Path, override_root: Option<&Path>) -> PathBuf {
        if let Some(root) = override_root {
            return root.to_path_buf();
        }
        match &self.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => base_dir.join(root),
            None => base_dir.to_path_buf(),
        }
    }
}

/// Load a catalog file and expand it; `override_root` replaces the file's `root`.
pub fn load_catalog(path: &Path, override_root: Option<&Path>) -> Result<Catalog, CatalogError> {
    let file = CatalogFile::load(path)?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let root = file.resolve_root(base_dir, override_root);
    tracing::debug!(catalog = %path.display(), root = %root.display(), "loading catalog");
    file.into_catalog(&root)
}
