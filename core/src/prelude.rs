use crate::overlay::Rgba;

/// Terminal failures surfaced by the detection client.
///
/// Transient transport failures never appear here: they are absorbed by the
/// retry loop and collapse into an empty response once retries run out.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("image too large, please select an image smaller than 25MB")]
    PayloadTooLarge,
    #[error("monthly request limit reached, upgrade your plan to unlock unlimited requests")]
    QuotaExceeded,
    #[error("{0}")]
    ServerRejected(String),
    #[error("malformed detection response: {0}")]
    MalformedResponse(String),
    #[error("invalid detection request: {0}")]
    InvalidRequest(String),
}

impl DetectionError {
    /// Stable identifier used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DetectionError::PayloadTooLarge => "payload_too_large",
            DetectionError::QuotaExceeded => "quota_exceeded",
            DetectionError::ServerRejected(_) => "server_rejected",
            DetectionError::MalformedResponse(_) => "malformed_response",
            DetectionError::InvalidRequest(_) => "invalid_request",
        }
    }
}

pub type DetectionOutcome<T> = Result<T, DetectionError>;

/// Two-dimensional drawing target the overlay renderer paints onto.
///
/// Coordinates are in surface pixels with a top-left origin. Text positions
/// name the top-left corner of the glyph run.
pub trait Surface {
    fn resize(&mut self, width: f32, height: f32);
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba, line_width: f32);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, font_px: f32, color: Rgba);
    fn stroke_text(&mut self, text: &str, x: f32, y: f32, font_px: f32, color: Rgba, line_width: f32);
    /// Advance width of `text` rendered at `font_px`.
    fn measure_text(&self, text: &str, font_px: f32) -> f32;
}
