//! Catalog of wanted assets: one entry per destination path, in run order.

mod file;
pub mod naming;

pub use file::{load_catalog, AssetBlock, CatalogFile, SectionBlock};

use crate::media::MediaKind;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// One wanted asset. `destination_path` is the idempotency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCatalogEntry {
    pub destination_path: PathBuf,
    pub section_id: String,
    pub keyword: String,
    pub media_kind: MediaKind,
    /// How many assets the section asked for (context for records and logs).
    pub desired_count: u32,
    /// Known direct URL; bypasses the resolver.
    pub source_url: Option<String>,
    pub title: Option<String>,
    /// Size hint for the skip-if-complete check.
    pub expected_bytes: Option<u64>,
    pub page: Option<String>,
}

impl AssetCatalogEntry {
    /// Entry with the kind derived from the destination's extension.
    pub fn new(
        destination_path: impl Into<PathBuf>,
        section_id: impl Into<String>,
        keyword: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let destination_path = destination_path.into();
        let media_kind = MediaKind::from_path(&destination_path).ok_or_else(|| {
            CatalogError::UnknownMediaKind {
                path: destination_path.clone(),
            }
        })?;
        Ok(Self {
            destination_path,
            section_id: section_id.into(),
            keyword: keyword.into(),
            media_kind,
            desired_count: 1,
            source_url: None,
            title: None,
            expected_bytes: None,
            page: None,
        })
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_expected_bytes(mut self, bytes: u64) -> Self {
        self.expected_bytes = Some(bytes);
        self
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn file_name(&self) -> String {
        self.destination_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Title used for placeholders and sidecar records.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(t) if !t.trim().is_empty() => t.clone(),
            _ => naming::title_case(&self.keyword),
        }
    }

    /// Key of the section group the runner paces between.
    pub fn section_key(&self) -> (Option<&str>, &str) {
        (self.page.as_deref(), self.section_id.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("read catalog {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse catalog {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("duplicate destination {}", .0.display())]
    DuplicatePath(PathBuf),
    #[error("cannot tell media kind of {} from its extension", .path.display())]
    UnknownMediaKind { path: PathBuf },
    #[error("entry {} has an empty keyword", .0.display())]
    EmptyKeyword(PathBuf),
}

/// Ordered, validated list of entries.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<AssetCatalogEntry>,
}

impl Catalog {
    /// Validate uniqueness of destination paths; order is preserved.
    pub fn new(entries: Vec<AssetCatalogEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.keyword.trim().is_empty() {
                return Err(CatalogError::EmptyKeyword(entry.destination_path.clone()));
            }
            if !seen.insert(entry.destination_path.as_path()) {
                return Err(CatalogError::DuplicatePath(entry.destination_path.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[AssetCatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetCatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, destination: &Path) -> Option<&AssetCatalogEntry> {
        self.entries.iter().find(|e| e.destination_path == destination)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a AssetCatalogEntry;
    type IntoIter = std::slice::Iter<'a, AssetCatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
