use crate::api::Detection;

/// Axis-aligned rectangle in surface pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when the rectangle lies entirely inside `[0, width] x [0, height]`.
    pub fn within(&self, width: f32, height: f32) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= width && self.bottom() <= height
    }

    /// Maps a detection from capture pixels to surface pixels.
    ///
    /// Negative sizes collapse to zero.
    pub fn scaled(detection: &Detection, scale: f32) -> Self {
        Self::new(
            detection.x * scale,
            detection.y * scale,
            detection.width.max(0.0) * scale,
            detection.height.max(0.0) * scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_multiplies_every_component() {
        let cat = Detection::new("cat", 0, 10.0, 10.0, 100.0, 50.0);
        assert_eq!(Rect::scaled(&cat, 2.0), Rect::new(20.0, 20.0, 200.0, 100.0));
    }

    #[test]
    fn scaled_clamps_negative_sizes() {
        let odd = Detection::new("odd", 0, 4.0, 4.0, -3.0, 2.0);
        let rect = Rect::scaled(&odd, 0.5);
        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 1.0);
    }

    #[test]
    fn within_checks_all_edges() {
        assert!(Rect::new(0.0, 0.0, 10.0, 10.0).within(10.0, 10.0));
        assert!(!Rect::new(-0.5, 0.0, 10.0, 10.0).within(10.0, 10.0));
        assert!(!Rect::new(1.0, 1.0, 10.0, 10.0).within(10.0, 10.0));
    }
}
