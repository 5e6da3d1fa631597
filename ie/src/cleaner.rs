//! Frame cleanup ahead of label clustering.
//!
//! Labels float over the game world, so the cleaner drops everything that is
//! known not to be a label: persistent HUD chrome (via the HUD mask) and any
//! bright blob attached to the frame border (via morphological reconstruction).

use std::path::Path;

use image::GrayImage;
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;

use crate::{ColorFilter, ColorRange, CropError, HsvFilter, Image, OwnedImage};

/// Luma above which a pixel counts as foreground.
pub const FOREGROUND_LUMA: u8 = 15;

/// Load a HUD mask and binarize it (values above 1 become 255).
pub fn load_hud_mask(path: impl AsRef<Path>) -> Result<GrayImage, CropError> {
	let path = path.as_ref();
	let mask = image::open(path)
		.map_err(|source| CropError::HudMask { path: path.to_path_buf(), source })?
		.to_luma8();
	Ok(binarize_hud_mask(&mask))
}

pub fn binarize_hud_mask(mask: &GrayImage) -> GrayImage {
	threshold(mask, 1, ThresholdType::Binary)
}

pub struct FrameCleaner<F = HsvFilter> {
	hud_mask: Option<GrayImage>,
	highlight: ColorRange,
	filter: F,
}

impl FrameCleaner {
	/// `hud_mask` is expected to be binarized already (see [`load_hud_mask`]).
	pub fn new(highlight: ColorRange, hud_mask: Option<GrayImage>) -> Self {
		Self::with_filter(highlight, hud_mask, HsvFilter)
	}
}

impl<F: ColorFilter> FrameCleaner<F> {
	pub fn with_filter(highlight: ColorRange, hud_mask: Option<GrayImage>, filter: F) -> Self {
		Self {
			hud_mask,
			highlight,
			filter,
		}
	}

	/// Zero out HUD chrome and border-attached blobs, keeping everything else
	/// at its original color.
	pub fn clean(&self, frame: Image) -> OwnedImage {
		let mut img = frame.to_owned_image();

		if let Some(mask) = &self.hud_mask {
			if mask.dimensions() == (img.width(), img.height()) {
				img.retain_masked(mask);
			} else {
				tracing::debug!(
					frame = ?(img.width(), img.height()),
					mask = ?mask.dimensions(),
					"frame size differs from HUD mask; skipping mask"
				);
			}
		}

		// The hover highlight is bright enough to survive thresholding and would
		// glue the label it sits behind to whatever else it touches.
		let highlight = self.filter.filter(img.as_image(), &self.highlight).mask;
		img.clear_masked(&highlight);

		let binary = threshold(&img.to_gray_image(), FOREGROUND_LUMA, ThresholdType::Binary);
		let border = reconstruct_from_border(&binary, iteration_cap(&binary));
		if !border.converged {
			tracing::warn!(
				iterations = border.iterations,
				"border reconstruction hit its iteration cap"
			);
		}

		img.clear_masked(&border.marker);
		img
	}
}

/// Result of [`reconstruct_from_border`].
#[derive(Debug, Clone)]
pub struct Reconstruction {
	/// Every foreground pixel connected to the image border.
	pub marker: GrayImage,
	pub iterations: u32,
	/// `false` if the iteration cap stopped the loop before a fixed point.
	pub converged: bool,
}

/// Upper bound on reconstruction iterations for an image: twice its
/// half-perimeter, which bounds the diagonal.
pub fn iteration_cap(image: &GrayImage) -> u32 {
	(2 * (image.width() + image.height())).max(1)
}

/// Morphological reconstruction by dilation, seeded with the 1-pixel border
/// of `reference`.
///
/// The marker is repeatedly dilated with a 3×3 square and clipped to
/// `reference` until it stops changing or `max_iterations` is reached.
pub fn reconstruct_from_border(reference: &GrayImage, max_iterations: u32) -> Reconstruction {
	let (w, h) = reference.dimensions();

	let mut marker = GrayImage::new(w, h);
	for (x, y, p) in reference.enumerate_pixels() {
		if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
			marker.put_pixel(x, y, *p);
		}
	}

	let mut iterations = 0;
	while iterations < max_iterations {
		iterations += 1;

		let mut next = dilate(&marker, Norm::LInf, 1);
		let mut changed = false;
		for ((n, r), m) in next.pixels_mut().zip(reference.pixels()).zip(marker.pixels()) {
			n.0[0] = n.0[0].min(r.0[0]);
			changed |= n.0[0] != m.0[0];
		}
		marker = next;

		if !changed {
			return Reconstruction {
				marker,
				iterations,
				converged: true,
			};
		}
	}

	Reconstruction {
		marker,
		iterations,
		converged: false,
	}
}
