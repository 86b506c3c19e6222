//! Sidecar `metadata.csv` tables, one per destination directory.

use crate::catalog::naming::title_case;
use crate::catalog::AssetCatalogEntry;
use crate::media::MediaKind;
use crate::storage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

pub const SIDECAR_FILE_NAME: &str = "metadata.csv";

/// Licence line of every synthesized asset.
pub const PLACEHOLDER_LICENSE: &str = "Synthesized placeholder (no licensed source)";

/// Licence line of fetched assets whose source reported none.
pub const UNVERIFIED_LICENSE: &str = "Unverified; check the source before publishing";

/// One row of a sidecar table. Column order is the file's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub filename: String,
    pub alt_text: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub source_url: String,
    pub license_info: String,
    pub file_size_bytes: u64,
    /// `WIDTHxHEIGHT`, empty when unknown.
    pub dimensions: String,
}

/// Where a complete asset's bytes came from.
#[derive(Debug, Clone, Copy)]
pub enum RecordSource<'a> {
    Fetched {
        url: &'a str,
        license: Option<&'a str>,
    },
    Placeholder,
}

impl AssetRecord {
    pub fn for_entry(
        entry: &AssetCatalogEntry,
        source: RecordSource<'_>,
        file_size_bytes: u64,
        dimensions: Option<(u32, u32)>,
    ) -> Self {
        let keyword = entry.keyword.trim();
        let section = entry.section_id.trim();
        let noun = match entry.media_kind {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        };
        let mut keywords = vec![keyword.to_string(), section.to_string()];
        if let Some(page) = entry.page.as_deref().filter(|p| !p.trim().is_empty()) {
            keywords.push(page.trim().to_string());
        }
        keywords.push("professional".to_string());
        keywords.push("business".to_string());

        let (source_url, license_info) = match source {
            RecordSource::Fetched { url, license } => {
                (url.to_string(), license.unwrap_or(UNVERIFIED_LICENSE).to_string())
            }
            RecordSource::Placeholder => (String::new(), PLACEHOLDER_LICENSE.to_string()),
        };

        Self {
            filename: entry.file_name(),
            alt_text: format!("{} for {}", title_case(keyword), title_case(section)),
            title: format!("{} - {}", entry.display_title(), title_case(section)),
            description: format!("High-quality {keyword} {noun} for {section} section"),
            keywords: keywords.join(", "),
            source_url,
            license_info,
            file_size_bytes,
            dimensions: dimensions
                .map(|(w, h)| format!("{w}x{h}"))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SidecarError {
    #[error("sidecar {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("sidecar {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Rows of every sidecar touched in this run, keyed by directory.
///
/// A directory's table is started on its first record: empty, or (with
/// `merge`) seeded from the existing file. Every append rewrites that
/// directory's file in full.
#[derive(Debug, Default)]
pub struct SidecarSet {
    merge: bool,
    tables: BTreeMap<PathBuf, Vec<AssetRecord>>,
}

impl SidecarSet {
    pub fn new(merge: bool) -> Self {
        Self {
            merge,
            tables: BTreeMap::new(),
        }
    }

    /// Add `record` to the table for `dir` (replacing a row with the same filename) and rewrite it.
    pub fn append(&mut self, dir: &Path, record: AssetRecord) -> Result<PathBuf, SidecarError> {
        let path = dir.join(SIDECAR_FILE_NAME);
        if !self.tables.contains_key(dir) {
            let seed = if self.merge { read_table(&path)? } else { Vec::new() };
            self.tables.insert(dir.to_path_buf(), seed);
        }
        let rows = self.tables.entry(dir.to_path_buf()).or_default();
        rows.retain(|r| r.filename != record.filename);
        rows.push(record);
        write_table(&path, rows)?;
        Ok(path)
    }
}

/// Rows of an existing sidecar; a missing file is an empty table, malformed rows are skipped.
pub fn read_table(path: &Path) -> Result<Vec<AssetRecord>, SidecarError> {
    let mut reader = match csv::Reader::from_path(path) {
        Ok(r) => r,
        Err(e) => match e.kind() {
            csv::ErrorKind::Io(io) if io.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            _ => {
                return Err(SidecarError::Csv {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        },
    };
    let mut rows = Vec::new();
    for row in reader.deserialize::<AssetRecord>() {
        match row {
            Ok(r) => rows.push(r),
            Err(e) => tracing::warn!(sidecar = %path.display(), error = %e, "skipping malformed row"),
        }
    }
    Ok(rows)
}

fn write_table(path: &Path, rows: &[AssetRecord]) -> Result<(), SidecarError> {
    let csv_err = |source| SidecarError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let io_err = |source| SidecarError::Io {
        path: path.to_path_buf(),
        source,
    };
    storage::ensure_parent_dir(path).map_err(io_err)?;
    let staging = storage::part_path(path);
    let mut writer = csv::Writer::from_path(&staging).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(io_err)?;
    drop(writer);
    storage::finalize(&staging, path).map_err(io_err)
}
