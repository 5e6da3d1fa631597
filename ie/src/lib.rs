mod image;
pub use image::*;
mod color;
pub use color::*;
mod rect;
pub use rect::*;
mod error;
pub use error::*;
mod contours;
pub use contours::*;
mod cleaner;
pub use cleaner::*;
mod cluster;
pub use cluster::*;

use std::path::Path;
use std::time::Instant;

use anyhow::Context;

/// Item label locator: frame cleanup followed by per-rarity clustering.
pub struct Ie {
	cleaner: FrameCleaner,
	clusterer: LabelClusterer,
}

impl Ie {
	/// Build the pipeline, loading the HUD mask from disk.
	pub fn try_new(colors: &ColorConfig, hud_mask: impl AsRef<Path>) -> anyhow::Result<Self> {
		let hud_mask = hud_mask.as_ref();
		let mask = load_hud_mask(hud_mask)?;
		Self::new(colors, Some(mask)).with_context(|| format!("invalid color configuration (HUD mask {:?})", hud_mask))
	}

	/// Build the pipeline from an already binarized HUD mask, or none at all.
	pub fn new(colors: &ColorConfig, hud_mask: Option<::image::GrayImage>) -> Result<Self, CropError> {
		colors.validate()?;
		Ok(Self {
			cleaner: FrameCleaner::new(*colors.highlight()?, hud_mask),
			clusterer: LabelClusterer::try_new(colors)?,
		})
	}

	pub fn clean(&self, image: Image) -> OwnedImage {
		self.cleaner.clean(image)
	}

	/// Locate item labels in a captured frame.
	pub fn crop(&self, image: Image, padding_y: u32) -> Vec<LabelCandidate> {
		let start = Instant::now();
		let cleaned = self.cleaner.clean(image);
		let clean_time = start.elapsed();

		let start = Instant::now();
		let labels = self.clusterer.extract(cleaned.as_image(), padding_y);

		tracing::debug!(
			clean = ?clean_time,
			cluster = ?start.elapsed(),
			labels = labels.len(),
			"cropped frame"
		);
		labels
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_missing_highlight_rejected() {
		let mut colors = ColorConfig::default();
		colors.remove(HIGHLIGHT_KEY);
		assert!(matches!(Ie::new(&colors, None), Err(CropError::MissingColor(k)) if k == HIGHLIGHT_KEY));
	}

	#[test]
	fn test_missing_mask_file() {
		let err = match Ie::try_new(&ColorConfig::default(), "does/not/exist.png") {
			Err(err) => err,
			Ok(_) => panic!("expected an error"),
		};
		assert!(matches!(err.downcast_ref::<CropError>(), Some(CropError::HudMask { .. })));
	}

	#[test]
	fn test_blank_frame() {
		let ie = Ie::new(&ColorConfig::default(), None).unwrap();
		let frame = OwnedImage::new(128, 72);
		assert!(ie.crop(frame.as_image(), DEFAULT_PADDING_Y).is_empty());
		assert_eq!(ie.clean(frame.as_image()), frame);
	}

	#[test]
	fn test_shareable_across_threads() {
		fn assert_send_sync<T: Send + Sync>() {}
		assert_send_sync::<Ie>();
	}
}
