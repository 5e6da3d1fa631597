//! Persistent scanner configuration.
//!
//! Stored as JSON in a platform-appropriate config directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk configuration for the scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HUD mask PNG. Relative paths are looked up in the asset directories.
    pub hud_mask: PathBuf,

    /// Extra rows added above and below every label region.
    pub padding_y: u32,

    /// Color ranges for the hover highlight and every rarity.
    pub colors: ie::ColorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hud_mask: PathBuf::from("assets/hud_mask.png"),
            padding_y: ie::DEFAULT_PADDING_Y,
            colors: ie::ColorConfig::default(),
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("dropscan.json"))
    }

    /// Load configuration from disk, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration from the default location.
    pub fn try_load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_path(&path)
    }

    /// Load configuration from an explicit file. Missing files are an error.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("parse {:?}", path))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.colors.validate()?;
        Ok(cfg)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(&path, json).with_context(|| format!("write {:?}", path))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut cfg = Config::default();
        cfg.padding_y = 7;
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), cfg);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let cfg = Config::from_json(r#"{"padding_y": 3}"#).unwrap();
        assert_eq!(cfg.padding_y, 3);
        assert_eq!(cfg.colors, ie::ColorConfig::default());
        assert_eq!(cfg.hud_mask, PathBuf::from("assets/hud_mask.png"));
    }

    #[test]
    fn test_incomplete_colors_rejected() {
        let json = r#"{"colors": {"white": {"lower": [0, 0, 150], "upper": [0, 0, 255]}}}"#;
        let err = Config::from_json(json).unwrap_err();
        assert!(err.to_string().contains("item_highlight"), "{err}");
    }
}
