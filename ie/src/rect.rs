/// Axis-aligned rectangle in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Shrink the rectangle so it fits inside a `width` × `height` image.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Self {
            x,
            y,
            w: self.w.min(width - x),
            h: self.h.min(height - y),
        }
    }

    /// Grow the rectangle by `pad` above and below, clamped to the image.
    ///
    /// A rectangle closer than `pad` to the top edge is moved to `y = 0`
    /// without giving up any of the added height.
    pub fn padded_y(&self, pad: u32, width: u32, height: u32) -> Self {
        let y = if self.y > pad { self.y - pad } else { 0 };
        Self {
            x: self.x,
            y,
            w: self.w,
            h: self.h + pad * 2,
        }
        .clamped(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_y() {
        let r = Rect::new(10, 20, 50, 12);
        assert_eq!(r.padded_y(5, 200, 100), Rect::new(10, 15, 50, 22));
    }

    #[test]
    fn test_padded_y_near_top() {
        let r = Rect::new(10, 3, 50, 12);
        assert_eq!(r.padded_y(5, 200, 100), Rect::new(10, 0, 50, 22));
    }

    #[test]
    fn test_padded_y_clamped_at_bottom() {
        let r = Rect::new(10, 90, 50, 8);
        let p = r.padded_y(5, 200, 100);
        assert_eq!(p, Rect::new(10, 85, 50, 15));
        assert!(p.bottom() <= 100);
    }

    #[test]
    fn test_clamped_outside() {
        let r = Rect::new(250, 120, 10, 10).clamped(200, 100);
        assert!(r.is_empty());
        assert!(r.right() <= 200 && r.bottom() <= 100);
    }

    #[test]
    fn test_center() {
        assert_eq!(Rect::new(41, 35, 77, 22).center(), (79, 46));
    }
}
