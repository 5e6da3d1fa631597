//! Reporting and debug snapshots for scanned frames.

use std::path::Path;

use anyhow::{Context, Result};
use image::Rgb;
use imageproc::drawing::{draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use ie::{LabelCandidate, OwnedImage};

const REGION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const CENTER_COLOR: Rgb<u8> = Rgb([255, 0, 255]);

/// One line per label: `color x y w h cx cy`.
pub fn format_line(label: &LabelCandidate) -> String {
	let r = label.region;
	format!(
		"{} {} {} {} {} {} {}",
		label.color_key, r.x, r.y, r.w, r.h, label.center.0, label.center.1
	)
}

/// Draw every label region and center onto a copy of the frame.
pub fn annotate(frame: &OwnedImage, labels: &[LabelCandidate]) -> image::RgbImage {
	let mut img = frame.to_rgb_image();
	for label in labels {
		let r = label.region;
		draw_hollow_rect_mut(&mut img, Rect::at(r.x as i32, r.y as i32).of_size(r.w.max(1), r.h.max(1)), REGION_COLOR);
		let (cx, cy) = (label.center.0 as i32, label.center.1 as i32);
		for radius in 4..=6 {
			draw_hollow_circle_mut(&mut img, (cx, cy), radius, CENTER_COLOR);
		}
	}
	img
}

/// Write `<stem>_annotated.png`, `<stem>_clean.png` and one crop per label
/// into `out_dir`.
pub fn write_snapshots(
	out_dir: &Path,
	stem: &str,
	frame: &OwnedImage,
	cleaned: &OwnedImage,
	labels: &[LabelCandidate],
) -> Result<()> {
	std::fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;

	let annotated = out_dir.join(format!("{stem}_annotated.png"));
	annotate(frame, labels)
		.save_with_format(&annotated, image::ImageFormat::Png)
		.with_context(|| format!("write {:?}", annotated))?;

	cleaned
		.as_image()
		.save_png(out_dir.join(format!("{stem}_clean.png")))?;

	for (i, label) in labels.iter().enumerate() {
		let path = out_dir.join(format!("{stem}_{i}_{}.png", label.color_key));
		label
			.pixels
			.as_image()
			.save_png(&path)
			.with_context(|| format!("write {:?}", path))?;
	}

	tracing::debug!(dir = ?out_dir, labels = labels.len(), "wrote debug snapshots");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use ie::{Color, Rarity};

	fn label() -> LabelCandidate {
		let region = ie::Rect::new(10, 5, 30, 12);
		LabelCandidate {
			color_key: Rarity::Gold,
			region,
			pixels: OwnedImage::new(region.w, region.h),
			center: region.center(),
		}
	}

	#[test]
	fn test_format_line() {
		assert_eq!(format_line(&label()), "gold 10 5 30 12 25 11");
	}

	#[test]
	fn test_annotate_draws_region_outline() {
		let frame = OwnedImage::new(64, 32);
		let img = annotate(&frame, &[label()]);

		assert_eq!(img.dimensions(), (64, 32));
		assert_eq!(*img.get_pixel(10, 5), REGION_COLOR);
		assert_eq!(*img.get_pixel(39, 16), REGION_COLOR);
		assert_eq!(*img.get_pixel(12, 14), Rgb([0, 0, 0]));
		assert_eq!(frame.pixel(10, 5), Color::BLACK);
	}

	#[test]
	fn test_write_snapshots() {
		let dir = std::env::temp_dir().join(format!("dropscan-out-{}", std::process::id()));
		let frame = OwnedImage::new(64, 32);

		write_snapshots(&dir, "frame", &frame, &frame, &[label()]).unwrap();

		assert!(dir.join("frame_annotated.png").is_file());
		assert!(dir.join("frame_clean.png").is_file());
		let crop = OwnedImage::open(dir.join("frame_0_gold.png")).unwrap();
		assert_eq!((crop.width(), crop.height()), (30, 12));

		std::fs::remove_dir_all(&dir).unwrap();
	}
}
