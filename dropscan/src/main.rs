//! dropscan: locate item-name labels in captured game frames.
//!
//! Runs the label pipeline over PNG captures and prints one line per label.

mod assets;
mod config;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Locate item-name labels in captured game frames")]
struct Args {
    /// Config file to use instead of the one in the platform config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    /// HUD mask PNG (overrides the config).
    #[arg(long)]
    hud_mask: Option<PathBuf>,

    /// Rows added above and below every label (overrides the config).
    #[arg(long)]
    padding_y: Option<u32>,

    /// Write annotated frames, cleaned frames and label crops here.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Save the effective config to the platform config dir.
    #[arg(long)]
    save_config: bool,

    /// Captured frames.
    #[arg(required = true)]
    frames: Vec<PathBuf>,
}

fn main() -> Result<()> {
    // Structured logging. Use `RUST_LOG=debug` etc.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load_or_default(),
    };
    if let Some(hud_mask) = args.hud_mask {
        cfg.hud_mask = hud_mask;
    }
    if let Some(padding_y) = args.padding_y {
        cfg.padding_y = padding_y;
    }

    if args.save_config {
        let path = cfg.save()?;
        tracing::info!(path = ?path, "saved config");
    }

    let ie = build_pipeline(&cfg)?;

    let mut failed = 0;
    for frame in &args.frames {
        if let Err(err) = scan(&ie, frame, cfg.padding_y, args.out_dir.as_deref()) {
            tracing::error!(frame = ?frame, error = %format!("{err:#}"), "failed to scan frame");
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} frames failed", args.frames.len());
    }
    Ok(())
}

/// HUD masking only narrows the search, so a mask that is missing or fails to
/// decode is not fatal.
fn build_pipeline(cfg: &Config) -> Result<ie::Ie> {
    ie::Ie::new(&cfg.colors, load_hud_mask(&cfg.hud_mask)).context("invalid color configuration")
}

fn load_hud_mask(path: &Path) -> Option<image::GrayImage> {
    let loaded = assets::resolve_asset(path).and_then(|path| Ok(ie::load_hud_mask(path)?));
    match loaded {
        Ok(mask) => Some(mask),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "HUD mask unavailable; scanning without it");
            None
        }
    }
}

fn scan(ie: &ie::Ie, path: &Path, padding_y: u32, out_dir: Option<&Path>) -> Result<()> {
    let frame = ie::OwnedImage::open(path)?;
    let labels = ie.crop(frame.as_image(), padding_y);
    tracing::info!(frame = ?path, labels = labels.len(), "scanned frame");

    for label in &labels {
        println!("{}\t{}", path.display(), output::format_line(label));
    }

    if let Some(out_dir) = out_dir {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "frame".to_string());
        let cleaned = ie.clean(frame.as_image());
        output::write_snapshots(out_dir, &stem, &frame, &cleaned, &labels)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undecodable_mask_is_not_fatal() {
        let path = std::env::temp_dir().join(format!("dropscan-bad-mask-{}.png", std::process::id()));
        std::fs::write(&path, b"not a png").unwrap();

        assert!(load_hud_mask(&path).is_none());
        let cfg = Config {
            hud_mask: path.clone(),
            ..Config::default()
        };
        assert!(build_pipeline(&cfg).is_ok());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_mask_is_not_fatal() {
        let cfg = Config {
            hud_mask: PathBuf::from("/does/not/exist/hud_mask.png"),
            ..Config::default()
        };
        assert!(build_pipeline(&cfg).is_ok());
    }
}
