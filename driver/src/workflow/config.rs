use anyhow::Context;
use serde::{Deserialize, Serialize};
use snapcore::client::{DetectionParams, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DISPLAY_WIDTH: f32 = 640.0;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    pub endpoint: Option<String>,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_retries: u32,
    pub initial_delay_secs: f32,
    pub retry_delay_secs: f32,
    pub request_timeout_secs: Option<f32>,
    pub display_width: f32,
    pub spool_dir: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_retries: 10,
            initial_delay_secs: 0.0,
            retry_delay_secs: 2.0,
            request_timeout_secs: None,
            display_width: DEFAULT_DISPLAY_WIDTH,
            spool_dir: None,
        }
    }
}

impl DriverConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: DriverConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("iou_threshold", self.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be within 0..=1, got {}", name, value);
            }
        }
        for (name, value) in [
            ("initial_delay_secs", self.initial_delay_secs),
            ("retry_delay_secs", self.retry_delay_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{} must be a non-negative number, got {}", name, value);
            }
        }
        if let Some(timeout) = self.request_timeout_secs {
            if !timeout.is_finite() || timeout <= 0.0 {
                anyhow::bail!("request_timeout_secs must be positive, got {}", timeout);
            }
        }
        if !self.display_width.is_finite() || self.display_width <= 0.0 {
            anyhow::bail!("display_width must be positive, got {}", self.display_width);
        }
        Ok(())
    }

    pub fn endpoint(&self) -> anyhow::Result<&str> {
        self.endpoint
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .context("no detection endpoint configured (set DETECTION_URL or --endpoint)")
    }

    pub fn to_detection_params(&self) -> DetectionParams {
        DetectionParams {
            confidence_threshold: self.confidence_threshold,
            iou_threshold: self.iou_threshold,
            max_retries: self.max_retries,
            initial_delay: Duration::from_secs_f32(self.initial_delay_secs),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f32(self.retry_delay_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs_f32)
    }
}
