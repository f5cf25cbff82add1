use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use snapcore::Detection;

/// Configuration for generating synthetic predictions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub count: usize,
    pub image_width: u32,
    pub image_height: u32,
    pub labels: Vec<String>,
    /// Smallest and largest box side as a fraction of the image side.
    pub min_fraction: f32,
    pub max_fraction: f32,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 3,
            image_width: 1920,
            image_height: 1080,
            labels: ["person", "cat", "dog", "car", "bicycle", "bird", "chair"]
                .iter()
                .map(|label| label.to_string())
                .collect(),
            min_fraction: 0.05,
            max_fraction: 0.4,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    fn normalized_fractions(&self) -> (f32, f32) {
        let min = self.min_fraction.clamp(0.0, 1.0);
        let max = self.max_fraction.clamp(min, 1.0);
        (min, max)
    }
}

/// Boxes that always fit inside the configured image, labelled round-robin.
pub fn build_predictions(config: &GeneratorConfig) -> anyhow::Result<Vec<Detection>> {
    if config.labels.is_empty() {
        anyhow::bail!("generator needs at least one label");
    }
    if !config.min_fraction.is_finite() || !config.max_fraction.is_finite() {
        anyhow::bail!(
            "generator fractions must be finite (min {}, max {})",
            config.min_fraction,
            config.max_fraction
        );
    }
    let class_count = i32::try_from(config.labels.len()).context("too many generator labels")?;
    let (min, max) = config.normalized_fractions();
    let width = config.image_width.max(1) as f32;
    let height = config.image_height.max(1) as f32;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut predictions = Vec::with_capacity(config.count);
    for idx in 0..config.count {
        let class_id = idx as i32 % class_count;
        let box_width = width * rng.gen_range(min..=max);
        let box_height = height * rng.gen_range(min..=max);
        let x = rng.gen_range(0.0..=(width - box_width));
        let y = rng.gen_range(0.0..=(height - box_height));
        let confidence = rng.gen_range(0.25..=1.0);
        predictions.push(
            Detection::new(
                config.labels[class_id as usize].clone(),
                class_id,
                x.round(),
                y.round(),
                box_width.round(),
                box_height.round(),
            )
            .with_confidence(confidence),
        );
    }

    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_requested_count_inside_image() {
        let config = GeneratorConfig {
            count: 25,
            seed: 7,
            ..Default::default()
        };
        let predictions = build_predictions(&config).unwrap();
        assert_eq!(predictions.len(), 25);
        for detection in &predictions {
            assert!(detection.is_well_formed());
            assert!(detection.x + detection.width <= config.image_width as f32 + 1.0);
            assert!(detection.y + detection.height <= config.image_height as f32 + 1.0);
        }
        assert_eq!(predictions[8].class_id, 1);
        assert_eq!(predictions[8].label, "cat");
    }

    #[test]
    fn same_seed_replays_same_boxes() {
        let config = GeneratorConfig {
            seed: 13,
            ..Default::default()
        };
        assert_eq!(
            build_predictions(&config).unwrap(),
            build_predictions(&config).unwrap()
        );
    }

    #[test]
    fn empty_label_set_is_rejected() {
        let config = GeneratorConfig {
            labels: Vec::new(),
            ..Default::default()
        };
        assert!(build_predictions(&config).is_err());
    }

    #[test]
    fn non_finite_fractions_are_rejected() {
        let config: GeneratorConfig = serde_yaml::from_str("min_fraction: .nan\n").unwrap();
        assert!(build_predictions(&config).is_err());

        let config = GeneratorConfig {
            max_fraction: f32::INFINITY,
            ..Default::default()
        };
        assert!(build_predictions(&config).is_err());
    }
}
