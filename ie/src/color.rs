//! Rarity colors, color ranges and color filtering.
//!
//! Item labels are drawn in one color per rarity. A [`ColorRange`] describes
//! which pixels belong to a color as an inclusive box in 8-bit HSV space
//! (hue `0..180`, saturation and value `0..=255`).

use std::collections::BTreeMap;

use image::{GrayImage, Luma};

use crate::{CropError, Image, OwnedImage};

/// Configuration key of the UI hover highlight color.
pub const HIGHLIGHT_KEY: &str = "item_highlight";

/// Item rarity, in the order labels are searched and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    White,
    Gray,
    Blue,
    Green,
    Yellow,
    Gold,
    Orange,
}

impl Rarity {
    pub const ALL: [Self; 7] = [
        Self::White,
        Self::Gray,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Gold,
        Self::Orange,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Gray => "gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Gold => "gold",
            Self::Orange => "orange",
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Inclusive HSV box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ColorRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains_hsv(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| self.lower[i] <= hsv[i] && hsv[i] <= self.upper[i])
    }
}

/// Color ranges by configuration key.
///
/// Holds the highlight range under [`HIGHLIGHT_KEY`] and one range per
/// [`Rarity`] under its [`Rarity::key`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct ColorConfig(BTreeMap<String, ColorRange>);

impl ColorConfig {
    pub fn get(&self, key: &str) -> Result<&ColorRange, CropError> {
        self.0
            .get(key)
            .ok_or_else(|| CropError::MissingColor(key.to_string()))
    }

    pub fn highlight(&self) -> Result<&ColorRange, CropError> {
        self.get(HIGHLIGHT_KEY)
    }

    pub fn rarity(&self, rarity: Rarity) -> Result<&ColorRange, CropError> {
        self.get(rarity.key())
    }

    pub fn insert(&mut self, key: impl Into<String>, range: ColorRange) -> Option<ColorRange> {
        self.0.insert(key.into(), range)
    }

    pub fn remove(&mut self, key: &str) -> Option<ColorRange> {
        self.0.remove(key)
    }

    /// Check that the highlight and every rarity have a range.
    pub fn validate(&self) -> Result<(), CropError> {
        self.highlight()?;
        for rarity in Rarity::ALL {
            self.rarity(rarity)?;
        }
        Ok(())
    }
}

impl<K: Into<String>> FromIterator<(K, ColorRange)> for ColorConfig {
    fn from_iter<I: IntoIterator<Item = (K, ColorRange)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Default for ColorConfig {
    /// Ranges tuned for the 1280×720 capture.
    fn default() -> Self {
        [
            (HIGHLIGHT_KEY, ColorRange::new([107, 104, 73], [109, 110, 95])),
            ("white", ColorRange::new([0, 0, 150], [0, 0, 255])),
            ("gray", ColorRange::new([0, 0, 90], [0, 0, 126])),
            ("blue", ColorRange::new([117, 144, 157], [120, 150, 255])),
            ("green", ColorRange::new([59, 249, 227], [60, 253, 255])),
            ("yellow", ColorRange::new([29, 138, 164], [30, 143, 255])),
            ("gold", ColorRange::new([22, 77, 120], [23, 93, 235])),
            ("orange", ColorRange::new([18, 210, 130], [20, 235, 255])),
        ]
        .into_iter()
        .collect()
    }
}

// ----------

/// Output of a [`ColorFilter`]: a 0/255 mask of matching pixels and the input
/// with every non-matching pixel zeroed.
#[derive(Debug, Clone)]
pub struct Filtered {
    pub mask: GrayImage,
    pub image: OwnedImage,
}

/// Isolates the pixels of an image that fall inside a color range.
pub trait ColorFilter {
    fn filter(&self, image: Image, range: &ColorRange) -> Filtered;
}

/// [`ColorFilter`] over 8-bit HSV boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HsvFilter;

impl ColorFilter for HsvFilter {
    fn filter(&self, image: Image, range: &ColorRange) -> Filtered {
        let mut mask = GrayImage::new(image.width(), image.height());
        for (m, c) in mask.pixels_mut().zip(image.pixels()) {
            if range.contains_hsv(c.to_hsv()) {
                *m = Luma([255]);
            }
        }

        let mut out = image.to_owned_image();
        out.retain_masked(&mask);

        Filtered { mask, image: out }
    }
}
