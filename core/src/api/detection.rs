use serde::{Deserialize, Serialize};

/// One predicted object instance, in the pixel space of the captured image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "class")]
    pub label: String,
    pub class_id: i32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Detection {
    pub fn new(
        label: impl Into<String>,
        class_id: i32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            label: label.into(),
            class_id,
            x,
            y,
            width,
            height,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// True when every coordinate is finite and both sizes are non-negative.
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// Success body returned by the detection endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub predictions: Vec<Detection>,
}

impl DetectionResponse {
    pub fn new(predictions: Vec<Detection>) -> Self {
        Self { predictions }
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

/// Error body the endpoint may attach to a non-success status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_wire_shape() {
        let body = r#"{"predictions":[{"class":"cat","class_id":0,"x":10,"y":10,"width":100,"height":50,"confidence":0.91}]}"#;
        let response: DetectionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.predictions.len(), 1);
        let cat = &response.predictions[0];
        assert_eq!(cat.label, "cat");
        assert_eq!(cat.class_id, 0);
        assert_eq!(cat.width, 100.0);
        assert_eq!(cat.confidence, Some(0.91));
    }

    #[test]
    fn missing_predictions_default_to_empty() {
        let response: DetectionResponse = serde_json::from_str("{}").unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn negative_size_is_not_well_formed() {
        assert!(Detection::new("dog", 1, 0.0, 0.0, 5.0, 5.0).is_well_formed());
        assert!(!Detection::new("dog", 1, 0.0, 0.0, -1.0, 5.0).is_well_formed());
        assert!(!Detection::new("dog", 1, f32::NAN, 0.0, 1.0, 5.0).is_well_formed());
    }
}
