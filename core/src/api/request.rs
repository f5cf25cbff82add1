use crate::capture::CapturedImage;
use crate::prelude::{DetectionError, DetectionOutcome};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const FIELD_IMAGE: &str = "image";
pub const FIELD_CONF_THRES: &str = "conf_thres";
pub const FIELD_IOU_THRES: &str = "iou_thres";

/// Multipart payload sent on every detection attempt.
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub image: Arc<[u8]>,
    pub file_name: String,
    pub mime: &'static str,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
}

impl DetectionRequest {
    pub fn new(
        image: impl Into<Arc<[u8]>>,
        file_name: impl Into<String>,
        confidence_threshold: f32,
        iou_threshold: f32,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            image: image.into(),
            mime: mime_for(Path::new(&file_name)),
            file_name,
            confidence_threshold,
            iou_threshold,
        }
    }

    pub fn from_capture(
        image: &CapturedImage,
        confidence_threshold: f32,
        iou_threshold: f32,
    ) -> DetectionOutcome<Self> {
        let bytes = fs::read(image.path()).map_err(|err| {
            DetectionError::InvalidRequest(format!(
                "reading {}: {}",
                image.path().display(),
                err
            ))
        })?;
        let file_name = image
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture.jpg".into());
        Ok(Self::new(
            bytes,
            file_name,
            confidence_threshold,
            iou_threshold,
        ))
    }

    /// Text values of the two threshold form fields.
    pub fn threshold_fields(&self) -> [(&'static str, String); 2] {
        [
            (FIELD_CONF_THRES, self.confidence_threshold.to_string()),
            (FIELD_IOU_THRES, self.iou_threshold.to_string()),
        ]
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
