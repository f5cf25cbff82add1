use super::Rgba;
use crate::geometry::Rect;

/// Font size, padding, and colors of detection labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub font_px: f32,
    pub horizontal_padding: f32,
    pub vertical_padding: f32,
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_px: 16.0,
            horizontal_padding: 5.0,
            vertical_padding: 5.0,
            fill: Rgba::WHITE,
            stroke: Rgba::BLACK,
            stroke_width: 0.1,
        }
    }
}

impl LabelStyle {
    pub fn label_width(&self, text_width: f32) -> f32 {
        text_width + 2.0 * self.horizontal_padding
    }

    pub fn label_height(&self) -> f32 {
        self.font_px + 2.0 * self.vertical_padding
    }
}

/// Where a label box lands and where its text starts inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelLayout {
    pub bounds: Rect,
    pub text_x: f32,
    pub text_y: f32,
}

impl LabelLayout {
    /// Places a label directly above the top-left corner of `anchor`, then
    /// shifts it so it stays on a `surface_width` x `surface_height` surface.
    ///
    /// A label larger than the surface is pinned to the top-left corner.
    pub fn place(
        anchor: &Rect,
        text_width: f32,
        style: &LabelStyle,
        surface_width: f32,
        surface_height: f32,
    ) -> Self {
        let width = style.label_width(text_width);
        let height = style.label_height();

        let mut x = anchor.x;
        if x + width > surface_width {
            x = surface_width - width;
        }
        if x < 0.0 {
            x = 0.0;
        }

        let mut y = anchor.y - height;
        if y + height > surface_height {
            y = surface_height - height;
        }
        if y < 0.0 {
            y = 0.0;
        }

        Self {
            bounds: Rect::new(x, y, width, height),
            text_x: x + style.horizontal_padding,
            text_y: y + style.vertical_padding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f32 = 400.0;
    const H: f32 = 300.0;

    fn place(x: f32, y: f32, text_width: f32) -> LabelLayout {
        LabelLayout::place(
            &Rect::new(x, y, 50.0, 50.0),
            text_width,
            &LabelStyle::default(),
            W,
            H,
        )
    }

    #[test]
    fn label_sizes_include_padding() {
        let style = LabelStyle::default();
        assert_eq!(style.label_width(30.0), 40.0);
        assert_eq!(style.label_height(), 26.0);
    }

    #[test]
    fn label_sits_above_box_when_there_is_room() {
        let layout = place(100.0, 100.0, 30.0);
        assert_eq!(layout.bounds, Rect::new(100.0, 74.0, 40.0, 26.0));
        assert_eq!((layout.text_x, layout.text_y), (105.0, 79.0));
    }

    #[test]
    fn origin_box_keeps_label_on_surface() {
        let layout = place(0.0, 0.0, 30.0);
        assert_eq!(layout.bounds.x, 0.0);
        assert_eq!(layout.bounds.y, 0.0);
        assert!(layout.bounds.within(W, H));
    }

    #[test]
    fn negative_box_clamps_to_zero() {
        let layout = place(-20.0, -40.0, 30.0);
        assert_eq!((layout.bounds.x, layout.bounds.y), (0.0, 0.0));
    }

    #[test]
    fn bottom_right_box_keeps_label_inside() {
        let layout = place(W - 1.0, H + 80.0, 60.0);
        assert_eq!(layout.bounds.right(), W);
        assert_eq!(layout.bounds.bottom(), H);
        assert!(layout.bounds.within(W, H));
    }

    #[test]
    fn oversized_label_pins_to_origin() {
        let layout = place(10.0, 10.0, W * 2.0);
        assert_eq!(layout.bounds.x, 0.0);
    }
}
