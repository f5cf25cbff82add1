use crate::generator::profile::{build_predictions, GeneratorConfig};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use snapcore::{Detection, DetectionResponse};
use std::fs;
use std::path::Path;

/// How the mock endpoint answers every detection POST.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MockScenario {
    /// Status to answer with; success statuses carry predictions.
    pub status: Option<u16>,
    /// `message` of the JSON error body sent with a failure status.
    pub message: Option<String>,
    pub predictions: Vec<Detection>,
    /// Replaces `predictions` with synthetic boxes when present.
    pub generate: Option<GeneratorConfig>,
}

impl MockScenario {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading mock scenario {}", path_ref.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing mock scenario {}", path_ref.display()))
    }

    #[cfg(test)]
    pub fn with_predictions(predictions: Vec<Detection>) -> Self {
        Self {
            predictions,
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn failing(status: u16, message: Option<&str>) -> Self {
        Self {
            status: Some(status),
            message: message.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    /// Response body the scenario produces.
    pub fn body(&self) -> anyhow::Result<serde_json::Value> {
        let status = self.status();
        if (200..300).contains(&status) {
            let predictions = match &self.generate {
                Some(config) => build_predictions(config)?,
                None => self.predictions.clone(),
            };
            Ok(serde_json::to_value(DetectionResponse::new(predictions))?)
        } else {
            Ok(match &self.message {
                Some(message) => serde_json::json!({ "message": message }),
                None => serde_json::json!({}),
            })
        }
    }
}

/// Summary of one multipart form the mock endpoint received.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReceivedRequest {
    pub image_bytes: usize,
    pub image_name: Option<String>,
    pub conf_thres: Option<f32>,
    pub iou_thres: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_scenario_answers_empty_predictions() {
        let scenario = MockScenario::default();
        assert_eq!(scenario.status(), 200);
        assert_eq!(
            scenario.body().unwrap(),
            serde_json::json!({ "predictions": [] })
        );
    }

    #[test]
    fn failure_scenario_carries_message() {
        let scenario = MockScenario::failing(422, Some("bad image"));
        assert_eq!(
            scenario.body().unwrap(),
            serde_json::json!({ "message": "bad image" })
        );
    }

    #[test]
    fn scenario_loads_from_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"predictions:\n  - class: cat\n    class_id: 0\n    x: 10\n    y: 10\n    width: 100\n    height: 50\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let scenario = MockScenario::load(&path).unwrap();
        assert_eq!(scenario.predictions.len(), 1);
        assert_eq!(scenario.predictions[0].label, "cat");
    }

    #[test]
    fn generated_predictions_replace_explicit_ones() {
        let scenario = MockScenario {
            generate: Some(GeneratorConfig {
                count: 2,
                ..Default::default()
            }),
            ..Default::default()
        };
        let body: DetectionResponse = serde_json::from_value(scenario.body().unwrap()).unwrap();
        assert_eq!(body.predictions.len(), 2);
    }
}
