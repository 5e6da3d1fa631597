//! Label clustering.
//!
//! Each rarity color is isolated from the cleaned frame, smeared horizontally
//! so the glyphs of one label merge into a single region, and every region is
//! checked against the shape of an item label: text height, a dark backdrop
//! and sparse bright strokes. A final cross-check makes sure no other rarity
//! matches the crop better.

use image::GrayImage;
use imageproc::filter::horizontal_filter;

use crate::{
	ColorConfig, ColorFilter, ColorRange, ContourExtractor, CropError, HsvFilter, Image,
	ImageprocContours, OwnedImage, Rarity, Rect,
};

pub const DEFAULT_PADDING_Y: u32 = 5;

const BLUR_WIDTH: usize = 19;
// Sigma a 19-tap kernel gets when it is derived from the kernel size.
const BLUR_SIGMA: f32 = 0.3 * ((BLUR_WIDTH as f32 - 1.0) * 0.5 - 1.0) + 0.8;

/// Label text size at 1080p, scaled to the 720p capture.
const fn scale_720(v: u32) -> u32 {
	(2 * v + 1) / 3
}
const HEIGHT_RANGE: (u32, u32) = (scale_720(14), scale_720(40));
const WIDTH_RANGE: (u32, u32) = (scale_720(60), scale_720(1280));

/// A crop must contain a channel value below this (the dark label backdrop).
const MAX_BACKDROP: u8 = 14;
/// Exclusive bounds on a crop's truncated mean luma.
const MEAN_RANGE: (u32, u32) = (4, 25);

/// One located item label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCandidate {
	pub color_key: Rarity,
	/// Padded label region in frame coordinates.
	pub region: Rect,
	/// Color-filtered copy of the frame under `region`.
	pub pixels: OwnedImage,
	pub center: (u32, u32),
}

/// Result of clustering a single rarity color.
#[derive(Debug, Clone)]
pub struct ColorPass {
	/// Regions found before any filtering.
	pub regions: usize,
	pub candidates: Vec<LabelCandidate>,
}

pub struct LabelClusterer<F = HsvFilter, C = ImageprocContours> {
	ranges: Vec<(Rarity, ColorRange)>,
	filter: F,
	contours: C,
	kernel: Vec<f32>,
}

impl LabelClusterer {
	pub fn try_new(colors: &ColorConfig) -> Result<Self, CropError> {
		Self::with_capabilities(colors, HsvFilter, ImageprocContours)
	}
}

impl<F: ColorFilter, C: ContourExtractor> LabelClusterer<F, C> {
	/// Resolves every rarity range up front, so a missing one fails here and
	/// not in the middle of a frame.
	pub fn with_capabilities(colors: &ColorConfig, filter: F, contours: C) -> Result<Self, CropError> {
		let ranges = Rarity::ALL
			.iter()
			.map(|&r| colors.rarity(r).map(|range| (r, *range)))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self {
			ranges,
			filter,
			contours,
			kernel: gaussian_kernel(BLUR_WIDTH, BLUR_SIGMA),
		})
	}

	/// Locate labels of every rarity, in rarity order.
	pub fn extract(&self, cleaned: Image, padding_y: u32) -> Vec<LabelCandidate> {
		self.ranges
			.iter()
			.flat_map(|(rarity, range)| self.extract_color(cleaned, *rarity, range, padding_y).candidates)
			.collect()
	}

	/// Locate labels of a single rarity.
	pub fn extract_rarity(&self, cleaned: Image, rarity: Rarity, padding_y: u32) -> Result<ColorPass, CropError> {
		let (_, range) = self
			.ranges
			.iter()
			.find(|(r, _)| *r == rarity)
			.ok_or_else(|| CropError::MissingColor(rarity.key().to_string()))?;
		Ok(self.extract_color(cleaned, rarity, range, padding_y))
	}

	fn extract_color(&self, cleaned: Image, rarity: Rarity, range: &ColorRange, padding_y: u32) -> ColorPass {
		let filtered = self.filter.filter(cleaned, range).image;
		let blurred: GrayImage = horizontal_filter(&filtered.to_gray_image(), self.kernel.as_slice());
		let boxes = self.contours.external_boxes(&blurred);

		let mut candidates = Vec::new();
		for rect in &boxes {
			if !expected_size(rect) {
				continue;
			}

			// Filtered glyphs lose their ascenders and descenders; pad them back.
			let region = rect.padded_y(padding_y, filtered.width(), filtered.height());
			if region.is_empty() {
				continue;
			}

			let crop = filtered.as_image().sub_image(region.x, region.y, region.w, region.h);
			if !looks_like_label(crop) {
				continue;
			}

			let dominant = self.dominant_color(crop);
			if dominant != rarity {
				tracing::trace!(%rarity, %dominant, ?region, "label matches another rarity better");
				continue;
			}

			candidates.push(LabelCandidate {
				color_key: rarity,
				region,
				pixels: crop.to_owned_image(),
				center: region.center(),
			});
		}

		ColorPass {
			regions: boxes.len(),
			candidates,
		}
	}

	/// Rarity whose filter keeps the most intensity in `crop`.
	///
	/// Ties go to the rarity listed first.
	pub fn dominant_color(&self, crop: Image) -> Rarity {
		let mut best = (Rarity::ALL[0], f64::MIN);
		for (rarity, range) in &self.ranges {
			let mean = self.filter.filter(crop, range).image.as_image().mean_luma();
			if mean > best.1 {
				best = (*rarity, mean);
			}
		}
		best.0
	}
}

fn expected_size(rect: &Rect) -> bool {
	HEIGHT_RANGE.0 < rect.h && rect.h < HEIGHT_RANGE.1 && WIDTH_RANGE.0 < rect.w && rect.w < WIDTH_RANGE.1
}

/// Mostly dark with a few bright strokes.
fn looks_like_label(crop: Image) -> bool {
	let mean = crop.mean_luma() as u32;
	crop.min_channel() < MAX_BACKDROP && MEAN_RANGE.0 < mean && mean < MEAN_RANGE.1
}

fn gaussian_kernel(len: usize, sigma: f32) -> Vec<f32> {
	let mid = (len / 2) as f32;
	let mut kernel: Vec<f32> = (0..len)
		.map(|i| {
			let d = i as f32 - mid;
			(-(d * d) / (2.0 * sigma * sigma)).exp()
		})
		.collect();
	let sum: f32 = kernel.iter().sum();
	for k in &mut kernel {
		*k /= sum;
	}
	kernel
}
