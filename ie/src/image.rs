//! Image primitives and utilities.
//!
//! Frames are held as a lightweight owned RGB image (`OwnedImage`). Analysis
//! mostly borrows a view (`Image<'a>`) and only copies pixels when a result has
//! to outlive the frame it came from (label crops handed back to the caller).

use std::path::Path;

use anyhow::{Context, Result};
use image::{GrayImage, Luma, RgbImage};

/// Owned RGB image (no alpha).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl OwnedImage {
    /// All-black image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![Color::BLACK; (width * height) as usize],
        }
    }

    pub fn from_rgb_image(img: &RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let data = img
            .pixels()
            .map(|p| Color::new(p.0[0], p.0[1], p.0[2]))
            .collect();

        Self {
            width,
            height,
            data,
        }
    }

    /// Decode an image file (any format `image` understands) as RGB.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("decode {:?}", path))?
            .to_rgb8();
        Ok(Self::from_rgb_image(&img))
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.data[(x + y * self.width) as usize]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.data[(x + y * self.width) as usize] = color;
    }

    pub fn map_pixels(&mut self, f: impl Fn(&mut Color)) {
        for v in &mut self.data {
            f(v);
        }
    }

    /// Keep pixels where `mask` is non-zero, zero the rest.
    ///
    /// `mask` must have the same dimensions as the image.
    pub fn retain_masked(&mut self, mask: &GrayImage) {
        debug_assert_eq!(mask.dimensions(), (self.width, self.height));
        for (v, m) in self.data.iter_mut().zip(mask.pixels()) {
            if m.0[0] == 0 {
                *v = Color::BLACK;
            }
        }
    }

    /// Zero pixels where `mask` is non-zero.
    pub fn clear_masked(&mut self, mask: &GrayImage) {
        debug_assert_eq!(mask.dimensions(), (self.width, self.height));
        for (v, m) in self.data.iter_mut().zip(mask.pixels()) {
            if m.0[0] != 0 {
                *v = Color::BLACK;
            }
        }
    }

    /// Create a borrowed view of this entire image.
    pub fn as_image<'a>(&'a self) -> Image<'a> {
        Image {
            x1: 0,
            y1: 0,
            x2: self.width,
            y2: self.height,
            true_width: self.width,
            data: &self.data,
        }
    }

    /// Convert to a grayscale `GrayImage` (luma).
    pub fn to_gray_image(&self) -> GrayImage {
        self.as_image().to_gray_image()
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let c = self.pixel(x, y);
            image::Rgb([c.r, c.g, c.b])
        })
    }
}

// ----------

/// Borrowed image view into an `OwnedImage`.
#[derive(Clone, Copy)]
pub struct Image<'a> {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    true_width: u32,
    data: &'a [Color],
}

impl<'a> Image<'a> {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    #[inline(always)]
    fn pixel(&self, x: u32, y: u32) -> &Color {
        &self.data[(x + y * self.true_width) as usize]
    }

    /// Iterate the view's pixels in row-major order.
    pub fn pixels(self) -> impl Iterator<Item = Color> + 'a {
        (self.y1..self.y2)
            .flat_map(move |y| (self.x1..self.x2).map(move |x| *self.pixel(x, y)))
    }

    pub fn to_owned_image(self) -> OwnedImage {
        OwnedImage {
            width: self.width(),
            height: self.height(),
            data: self.pixels().collect(),
        }
    }

    pub fn to_gray_image(&self) -> GrayImage {
        let mut out = GrayImage::new(self.width(), self.height());
        for (p, c) in out.pixels_mut().zip(self.pixels()) {
            *p = Luma([c.luma()]);
        }
        out
    }

    pub fn get_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width() * self.height() * 3) as usize);
        for clr in self.pixels() {
            bytes.extend_from_slice(&[clr.r, clr.g, clr.b]);
        }
        bytes
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.get_bytes();
        let img = RgbImage::from_raw(self.width(), self.height(), bytes)
            .context("RgbImage::from_raw failed")?;
        img.save_with_format(path, image::ImageFormat::Png)
            .context("save png")?;
        Ok(())
    }

    /// Create an arbitrary subimage (relative coordinates), clamped to this view.
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        Self {
            x1: self.x1 + x,
            y1: self.y1 + y,
            x2: self.x1 + x + width,
            y2: self.y1 + y + height,
            true_width: self.true_width,
            data: self.data,
        }
    }

    /// Mean luma over the view. Empty views average to 0.
    pub fn mean_luma(&self) -> f64 {
        let count = self.width() as u64 * self.height() as u64;
        if count == 0 {
            return 0.0;
        }
        let sum: u64 = self.pixels().map(|c| c.luma() as u64).sum();
        sum as f64 / count as f64
    }

    /// Smallest sample across all three channels.
    pub fn min_channel(&self) -> u8 {
        self.pixels()
            .map(|c| c.r.min(c.g).min(c.b))
            .min()
            .unwrap_or(u8::MAX)
    }
}

// ----------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Compute luma (grayscale intensity), rounded to the nearest integer.
    pub fn luma(&self) -> u8 {
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        ((299 * r + 587 * g + 114 * b + 500) / 1000) as u8
    }

    /// Convert to 8-bit HSV: hue in `0..180` (degrees halved), saturation and
    /// value in `0..=255`.
    pub fn to_hsv(&self) -> [u8; 3] {
        let r = self.r as f32;
        let g = self.g as f32;
        let b = self.b as f32;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let diff = max - min;

        let s = if max > 0.0 { 255.0 * diff / max } else { 0.0 };

        let h = if diff == 0.0 {
            0.0
        } else if max == r {
            60.0 * (g - b) / diff
        } else if max == g {
            120.0 + 60.0 * (b - r) / diff
        } else {
            240.0 + 60.0 * (r - g) / diff
        };
        let h = if h < 0.0 { h + 360.0 } else { h };

        // 360° halves to 180, which wraps back onto red.
        let h = ((h / 2.0).round() as u32 % 180) as u8;

        [h, s.round() as u8, max as u8]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(Color::new(255, 0, 0).to_hsv(), [0, 255, 255]);
        assert_eq!(Color::new(0, 255, 0).to_hsv(), [60, 255, 255]);
        assert_eq!(Color::new(0, 0, 255).to_hsv(), [120, 255, 255]);
        assert_eq!(Color::WHITE.to_hsv(), [0, 0, 255]);
        assert_eq!(Color::BLACK.to_hsv(), [0, 0, 0]);
    }

    #[test]
    fn test_hsv_tinted_blue() {
        assert_eq!(Color::new(100, 100, 255).to_hsv(), [120, 155, 255]);
    }

    #[test]
    fn test_luma_rounds() {
        assert_eq!(Color::WHITE.luma(), 255);
        assert_eq!(Color::new(40, 30, 20).luma(), 32);
        // 15.96 must land above the foreground threshold.
        assert_eq!(Color::new(0, 0, 140).luma(), 16);
        assert_eq!(Color::new(0, 0, 135).luma(), 15);
    }

    #[test]
    fn test_sub_image_is_clamped() {
        let img = OwnedImage::new(10, 8);
        let view = img.as_image().sub_image(6, 5, 20, 20);
        assert_eq!((view.width(), view.height()), (4, 3));

        let view = img.as_image().sub_image(30, 30, 5, 5);
        assert_eq!((view.width(), view.height()), (0, 0));
    }

    #[test]
    fn test_view_statistics() {
        let mut img = OwnedImage::new(4, 2);
        img.set_pixel(1, 0, Color::WHITE);
        img.set_pixel(2, 1, Color::new(40, 30, 20));

        let view = img.as_image();
        assert_eq!(view.min_channel(), 0);
        assert!((view.mean_luma() - 255.0 / 8.0 - 32.0 / 8.0).abs() < 1e-9);

        let bright = img.as_image().sub_image(1, 0, 1, 1);
        assert_eq!(bright.min_channel(), 255);
        assert_eq!(bright.to_owned_image().pixel(0, 0), Color::WHITE);
    }

    #[test]
    fn test_masks() {
        let mut img = OwnedImage::new(2, 1);
        img.map_pixels(|c| *c = Color::WHITE);

        let mut mask = GrayImage::new(2, 1);
        mask.put_pixel(1, 0, Luma([255]));

        let mut kept = img.clone();
        kept.retain_masked(&mask);
        assert_eq!(kept.pixel(0, 0), Color::BLACK);
        assert_eq!(kept.pixel(1, 0), Color::WHITE);

        let mut cleared = img;
        cleared.clear_masked(&mask);
        assert_eq!(cleared.pixel(0, 0), Color::WHITE);
        assert_eq!(cleared.pixel(1, 0), Color::BLACK);
    }
}
