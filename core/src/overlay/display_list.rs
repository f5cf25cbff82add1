use super::Rgba;
use crate::prelude::Surface;
use serde::Serialize;

/// Average glyph advance as a fraction of the font size.
pub const DEFAULT_GLYPH_ADVANCE: f32 = 0.6;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
        line_width: f32,
    },
    FillText {
        text: String,
        x: f32,
        y: f32,
        font_px: f32,
        color: Rgba,
    },
    StrokeText {
        text: String,
        x: f32,
        y: f32,
        font_px: f32,
        color: Rgba,
        line_width: f32,
    },
}

/// Surface that records draw calls instead of rasterizing them.
///
/// Front ends replay the recorded commands onto their own canvas; two lists
/// with equal commands and size paint identical pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayList {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
    #[serde(skip)]
    glyph_advance: f32,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayList {
    pub fn new() -> Self {
        Self::with_glyph_advance(DEFAULT_GLYPH_ADVANCE)
    }

    pub fn with_glyph_advance(glyph_advance: f32) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            commands: Vec::new(),
            glyph_advance,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_blank(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Surface for DisplayList {
    fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.commands.clear();
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba, line_width: f32) {
        self.commands.push(DrawCommand::StrokeRect {
            x,
            y,
            width,
            height,
            color,
            line_width,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font_px: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            font_px,
            color,
        });
    }

    fn stroke_text(&mut self, text: &str, x: f32, y: f32, font_px: f32, color: Rgba, line_width: f32) {
        self.commands.push(DrawCommand::StrokeText {
            text: text.to_string(),
            x,
            y,
            font_px,
            color,
            line_width,
        });
    }

    fn measure_text(&self, text: &str, font_px: f32) -> f32 {
        text.chars().count() as f32 * font_px * self.glyph_advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_drops_commands_but_keeps_size() {
        let mut list = DisplayList::new();
        list.resize(10.0, 20.0);
        list.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::BLACK);
        list.clear();
        assert!(list.is_blank());
        assert_eq!((list.width(), list.height()), (10.0, 20.0));
    }

    #[test]
    fn measure_scales_with_characters_and_font() {
        let list = DisplayList::with_glyph_advance(0.5);
        assert_eq!(list.measure_text("abcd", 16.0), 32.0);
        assert_eq!(list.measure_text("", 16.0), 0.0);
    }
}
