use super::GeometryError;
use crate::capture::CapturedImage;

/// On-screen size of a captured image after layout scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub displayed_width: f32,
    pub displayed_height: f32,
}

impl DisplayGeometry {
    pub fn new(displayed_width: f32, displayed_height: f32) -> Self {
        Self {
            displayed_width,
            displayed_height,
        }
    }

    /// Fits the image to `displayed_width`, keeping its aspect ratio.
    pub fn fit_width(image: &CapturedImage, displayed_width: f32) -> Result<Self, GeometryError> {
        let scale = Self::scale_between(displayed_width, image.original_width())?;
        Ok(Self::new(
            displayed_width,
            image.original_height() as f32 * scale,
        ))
    }

    /// Ratio applied uniformly to every detection coordinate.
    pub fn scale(&self, original_width: u32) -> Result<f32, GeometryError> {
        Self::scale_between(self.displayed_width, original_width)
    }

    fn scale_between(displayed_width: f32, original_width: u32) -> Result<f32, GeometryError> {
        if original_width == 0 {
            return Err(GeometryError::ZeroOriginalWidth);
        }
        if !displayed_width.is_finite() || displayed_width < 0.0 {
            return Err(GeometryError::InvalidDisplayWidth(displayed_width));
        }
        Ok(displayed_width / original_width as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_displayed_over_original() {
        let geometry = DisplayGeometry::new(960.0, 720.0);
        assert_eq!(geometry.scale(1920).unwrap(), 0.5);
    }

    #[test]
    fn fit_width_preserves_aspect_ratio() {
        let image = CapturedImage::new("shot.jpg", 4000, 3000);
        let geometry = DisplayGeometry::fit_width(&image, 400.0).unwrap();
        assert_eq!(geometry.displayed_height, 300.0);
        assert_eq!(geometry.scale(image.original_width()).unwrap(), 0.1);
    }

    #[test]
    fn zero_width_capture_is_rejected() {
        let geometry = DisplayGeometry::new(100.0, 100.0);
        assert!(matches!(
            geometry.scale(0),
            Err(GeometryError::ZeroOriginalWidth)
        ));
    }
}
