pub mod display;
pub mod rect;

pub use display::DisplayGeometry;
pub use rect::Rect;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("captured image reports zero width")]
    ZeroOriginalWidth,
    #[error("invalid displayed width {0}")]
    InvalidDisplayWidth(f32),
}
