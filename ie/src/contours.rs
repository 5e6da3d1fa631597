//! Connected-region extraction.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};

use crate::Rect;

/// Finds the outermost regions of non-zero pixels in a grayscale image.
pub trait ContourExtractor {
	/// Bounding boxes of the top-level outer contours, in discovery order.
	/// Contours nested inside another region are not reported.
	fn external_boxes(&self, image: &GrayImage) -> Vec<Rect>;
}

/// [`ContourExtractor`] backed by `imageproc`'s border following.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocContours;

impl ContourExtractor for ImageprocContours {
	fn external_boxes(&self, image: &GrayImage) -> Vec<Rect> {
		find_contours::<i32>(image)
			.iter()
			.filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
			.filter_map(bounding_rect)
			.collect()
	}
}

fn bounding_rect(c: &Contour<i32>) -> Option<Rect> {
	let mut min_x = i32::MAX;
	let mut min_y = i32::MAX;
	let mut max_x = i32::MIN;
	let mut max_y = i32::MIN;

	for p in &c.points {
		min_x = min_x.min(p.x);
		min_y = min_y.min(p.y);
		max_x = max_x.max(p.x);
		max_y = max_y.max(p.y);
	}

	if c.points.is_empty() || min_x < 0 || min_y < 0 {
		return None;
	}

	Some(Rect {
		x: min_x as u32,
		y: min_y as u32,
		w: (max_x - min_x + 1) as u32,
		h: (max_y - min_y + 1) as u32,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use image::Luma;

	fn fill(img: &mut GrayImage, r: Rect, v: u8) {
		for y in r.y..r.bottom() {
			for x in r.x..r.right() {
				img.put_pixel(x, y, Luma([v]));
			}
		}
	}

	#[test]
	fn test_separate_regions() {
		let mut img = GrayImage::new(40, 30);
		fill(&mut img, Rect::new(2, 3, 10, 4), 200);
		fill(&mut img, Rect::new(20, 15, 6, 9), 1);

		let mut boxes = ImageprocContours.external_boxes(&img);
		boxes.sort_by_key(|r| (r.y, r.x));
		assert_eq!(boxes, vec![Rect::new(2, 3, 10, 4), Rect::new(20, 15, 6, 9)]);
	}

	#[test]
	fn test_nested_region_ignored() {
		// Ring with a separate blob inside its hole.
		let mut img = GrayImage::new(30, 30);
		fill(&mut img, Rect::new(5, 5, 20, 20), 255);
		fill(&mut img, Rect::new(8, 8, 14, 14), 0);
		fill(&mut img, Rect::new(12, 12, 4, 4), 255);

		let boxes = ImageprocContours.external_boxes(&img);
		assert_eq!(boxes, vec![Rect::new(5, 5, 20, 20)]);
	}

	#[test]
	fn test_empty_image() {
		assert!(ImageprocContours.external_boxes(&GrayImage::new(16, 16)).is_empty());
	}
}
