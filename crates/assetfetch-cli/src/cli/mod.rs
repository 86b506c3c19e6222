//! CLI for the assetfetch batch asset fetcher.

mod commands;

use anyhow::Result;
use assetfetch_core::config::{self, AssetFetchConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use commands::{run_batch, run_placeholder, run_plan};

/// Top-level CLI for assetfetch.
#[derive(Debug, Parser)]
#[command(name = "assetfetch")]
#[command(about = "assetfetch: resumable batch fetcher for website media assets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch or synthesize every asset in a catalog.
    Run {
        /// Catalog file (TOML).
        catalog: PathBuf,
        /// Output root; overrides the catalog's `root`.
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
        /// Skip search lookups and pacing; entries without a URL get placeholders.
        #[arg(long)]
        offline: bool,
        /// Config file to use instead of the XDG default.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// List each catalog entry's state on disk without touching the network.
    Plan {
        /// Catalog file (TOML).
        catalog: PathBuf,
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
        /// Config file to use instead of the XDG default.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Write a single placeholder asset (kind from the file extension).
    Placeholder {
        /// Destination file.
        path: PathBuf,
        /// Title drawn on image placeholders.
        #[arg(long, default_value = "Placeholder")]
        title: String,
        /// Config file to use instead of the XDG default.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

/// Only `run` creates the default config file; the other commands just read it.
fn load_config(explicit: Option<&Path>, init_default: bool) -> Result<AssetFetchConfig> {
    let cfg = match explicit {
        Some(path) => config::load_from(path)?,
        None if init_default => config::load_or_init()?,
        None => config::load_or_default()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run {
                catalog,
                root,
                offline,
                config,
            } => {
                let cfg = load_config(config.as_deref(), true)?;
                run_batch(&cfg, &catalog, root.as_deref(), offline)?;
            }
            CliCommand::Plan {
                catalog,
                root,
                config,
            } => {
                let cfg = load_config(config.as_deref(), false)?;
                run_plan(&cfg, &catalog, root.as_deref())?;
            }
            CliCommand::Placeholder {
                path,
                title,
                config,
            } => {
                let cfg = load_config(config.as_deref(), false)?;
                run_placeholder(&cfg, &path, &title)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
