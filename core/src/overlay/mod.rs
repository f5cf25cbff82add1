//! Drawing detections over a displayed image.

pub mod display_list;
pub mod label;
pub mod palette;
pub mod renderer;

pub use display_list::{DisplayList, DrawCommand};
pub use label::{LabelLayout, LabelStyle};
pub use palette::{ClassColors, Palette};
pub use renderer::OverlayRenderer;

use serde::{Deserialize, Serialize};

/// 8-bit color with a fractional alpha, as CSS `rgba()` spells it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}
