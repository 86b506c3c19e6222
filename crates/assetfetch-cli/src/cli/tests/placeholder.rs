//! Tests for the placeholder subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_placeholder_with_title() {
    match parse(&["assetfetch", "placeholder", "hero.jpg", "--title", "Modern Office"]) {
        CliCommand::Placeholder {
            path,
            title,
            config,
        } => {
            assert_eq!(path, Path::new("hero.jpg"));
            assert_eq!(title, "Modern Office");
            assert!(config.is_none());
        }
        _ => panic!("expected Placeholder"),
    }
}

#[test]
fn cli_parse_placeholder_default_title() {
    match parse(&["assetfetch", "placeholder", "intro.mp4"]) {
        CliCommand::Placeholder { title, .. } => assert_eq!(title, "Placeholder"),
        _ => panic!("expected Placeholder"),
    }
}

#[test]
fn cli_parse_placeholder_config() {
    match parse(&["assetfetch", "placeholder", "a.png", "--config", "cfg.toml"]) {
        CliCommand::Placeholder { config, .. } => {
            assert_eq!(config.as_deref(), Some(Path::new("cfg.toml")))
        }
        _ => panic!("expected Placeholder"),
    }
}

#[test]
fn explicit_config_is_read_not_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    std::fs::write(&path, "[placeholder]\nwidth = 320\nheight = 240\nwatermark = \"x\"\n").unwrap();
    let cfg = crate::cli::load_config(Some(&path), false).unwrap();
    assert_eq!(cfg.placeholder().width, 320);
    assert!(crate::cli::load_config(Some(&dir.path().join("none.toml")), false).is_err());
    assert!(!dir.path().join("none.toml").exists());
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["assetfetch", "status"]).is_err());
}
