//! `assetfetch placeholder` – write one placeholder asset.

use anyhow::{Context, Result};
use assetfetch_core::config::AssetFetchConfig;
use assetfetch_core::media::MediaKind;
use assetfetch_core::placeholder::PlaceholderSynthesizer;
use std::path::Path;

pub fn run_placeholder(cfg: &AssetFetchConfig, path: &Path, title: &str) -> Result<()> {
    let kind = MediaKind::from_path(path)
        .with_context(|| format!("cannot tell media kind of {} from its extension", path.display()))?;
    let synthesizer = PlaceholderSynthesizer::from_config(cfg.placeholder());
    let made = synthesizer.synthesize(path, kind, title)?;
    let note = if made.degraded { " (text stand-in, no renderer)" } else { "" };
    println!("Wrote {} bytes to {}{}", made.bytes, path.display(), note);
    Ok(())
}
