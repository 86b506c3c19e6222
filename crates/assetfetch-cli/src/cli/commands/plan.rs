//! `assetfetch plan` – show what a run would do, from disk state only.

use anyhow::{Context, Result};
use assetfetch_core::catalog::{load_catalog, AssetCatalogEntry};
use assetfetch_core::config::AssetFetchConfig;
use assetfetch_core::storage;
use std::io;
use std::path::Path;

/// On-disk state of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanState {
    /// Final file passes the completeness check; a run skips it.
    Present(u64),
    /// Only a staging file exists; a run resumes from this many bytes.
    Partial(u64),
    Missing,
}

pub fn entry_state(entry: &AssetCatalogEntry, tolerance: f64) -> io::Result<PlanState> {
    let len = storage::existing_len(&entry.destination_path)?;
    if storage::is_complete(len, entry.expected_bytes, tolerance) {
        return Ok(PlanState::Present(len));
    }
    let staged = storage::existing_len(&storage::part_path(&entry.destination_path))?;
    if staged > 0 {
        Ok(PlanState::Partial(staged))
    } else {
        Ok(PlanState::Missing)
    }
}

pub fn run_plan(cfg: &AssetFetchConfig, catalog_path: &Path, root: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(catalog_path, root)
        .with_context(|| format!("load catalog {}", catalog_path.display()))?;
    if catalog.is_empty() {
        println!("Catalog is empty.");
        return Ok(());
    }

    let tolerance = cfg.tolerance();
    let (mut present, mut partial, mut missing) = (0usize, 0usize, 0usize);
    println!("{:<18} {:<6} {:<7} {}", "STATE", "KIND", "SOURCE", "PATH");
    for entry in &catalog {
        let state = entry_state(entry, tolerance)
            .with_context(|| format!("inspect {}", entry.destination_path.display()))?;
        let label = match state {
            PlanState::Present(_) => {
                present += 1;
                "present".to_string()
            }
            PlanState::Partial(n) => {
                partial += 1;
                format!("partial ({n} B)")
            }
            PlanState::Missing => {
                missing += 1;
                "missing".to_string()
            }
        };
        let source = if entry.source_url.is_some() { "url" } else { "search" };
        println!(
            "{:<18} {:<6} {:<7} {}",
            label,
            entry.media_kind.to_string(),
            source,
            entry.destination_path.display()
        );
    }
    println!();
    println!(
        "{} entries: {} present, {} partial, {} missing",
        catalog.len(),
        present,
        partial,
        missing
    );
    Ok(())
}
