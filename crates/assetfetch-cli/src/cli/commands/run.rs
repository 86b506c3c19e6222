//! `assetfetch run` – drive a catalog through the batch runner.

use anyhow::{bail, Context, Result};
use assetfetch_core::batch::{format_hms, BatchObserver, BatchRunner, EntryOutcome, ProgressSnapshot};
use assetfetch_core::catalog::{load_catalog, AssetCatalogEntry};
use assetfetch_core::config::{AssetFetchConfig, PacingConfig};
use assetfetch_core::control::RunControl;
use assetfetch_core::resolver::{OfflineResolver, PexelsResolver, SourceResolver};
use std::path::Path;

use super::interrupt::spawn_interrupt_listener;

/// Prints one line per settled entry.
struct ConsoleObserver;

impl BatchObserver for ConsoleObserver {
    fn on_entry_settled(
        &mut self,
        entry: &AssetCatalogEntry,
        outcome: &EntryOutcome,
        progress: &ProgressSnapshot,
    ) {
        println!(
            "[{}/{}] {:<12} {} ({})",
            progress.completed,
            progress.total,
            outcome.label(),
            entry.destination_path.display(),
            progress
        );
        if let EntryOutcome::Failed { reason, .. } = outcome {
            eprintln!("  {}", reason);
        }
    }
}

pub fn run_batch(
    cfg: &AssetFetchConfig,
    catalog_path: &Path,
    root: Option<&Path>,
    offline: bool,
) -> Result<()> {
    let catalog = load_catalog(catalog_path, root)
        .with_context(|| format!("load catalog {}", catalog_path.display()))?;
    if catalog.is_empty() {
        println!("Catalog is empty.");
        return Ok(());
    }

    let resolver: Box<dyn SourceResolver> = if offline {
        Box::new(OfflineResolver)
    } else {
        Box::new(
            PexelsResolver::from_config(cfg)
                .context("search resolver unavailable (use --offline to only synthesize placeholders)")?,
        )
    };
    let control = RunControl::new();
    if let Err(e) = spawn_interrupt_listener(control.clone()) {
        tracing::warn!(error = %e, "could not install interrupt handler; Ctrl-C aborts immediately");
    }
    let mut runner = BatchRunner::new(resolver, cfg).with_control(control);
    if offline {
        runner = runner.with_pacing(PacingConfig::none());
    }

    tracing::info!(catalog = %catalog_path.display(), entries = catalog.len(), offline, "run started");
    let summary = runner.run(&catalog, &mut ConsoleObserver);

    println!();
    println!("{}", summary);
    println!("{:<16} {:>6}", "elapsed", format_hms(summary.elapsed));
    if summary.sidecar_failures > 0 {
        eprintln!("warning: {} sidecar table(s) could not be written", summary.sidecar_failures);
    }
    if summary.not_attempted > 0 {
        eprintln!("stopped early: {} entries not attempted", summary.not_attempted);
    }
    if summary.has_failures() {
        bail!("{} of {} entries failed", summary.failed, summary.total);
    }
    Ok(())
}
