//! Training configuration parsing from environment variables.

use super::parse_env;
use crate::application::model::ModelConfig;
use crate::application::training::TrainingParams;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data/time_series_data.csv";
pub const DEFAULT_ARTIFACT_PATH: &str = "models/trend_classifier.json";
pub const DEFAULT_SEQUENCE_LENGTH: usize = 3;

/// Training environment configuration
#[derive(Debug, Clone)]
pub struct TrainingEnvConfig {
    pub data_path: PathBuf,
    pub artifact_path: PathBuf,
    pub sequence_length: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub seed: u64,
    pub validation_split: f64,
    /// Optional TOML file overriding the default architecture
    pub model_config_path: Option<PathBuf>,
}

impl Default for TrainingEnvConfig {
    fn default() -> Self {
        let params = TrainingParams::default();
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            epochs: params.epochs,
            batch_size: params.batch_size,
            seed: params.seed,
            validation_split: params.validation_split,
            model_config_path: None,
        }
    }
}

impl TrainingEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            data_path: env::var("DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            artifact_path: env::var("ARTIFACT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifact_path),
            sequence_length: parse_env("SEQUENCE_LENGTH", defaults.sequence_length)?,
            epochs: parse_env("EPOCHS", defaults.epochs)?,
            batch_size: parse_env("BATCH_SIZE", defaults.batch_size)?,
            seed: parse_env("TRAINING_SEED", defaults.seed)?,
            validation_split: parse_env("VALIDATION_SPLIT", defaults.validation_split)?,
            model_config_path: env::var("MODEL_CONFIG_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn training_params(&self) -> TrainingParams {
        TrainingParams {
            epochs: self.epochs,
            batch_size: self.batch_size,
            seed: self.seed,
            validation_split: self.validation_split,
            ..TrainingParams::default()
        }
    }

    /// Architecture from `model_config_path`, or the defaults.
    pub fn model_config(&self) -> Result<ModelConfig> {
        match &self.model_config_path {
            Some(path) => ModelConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load model config from {:?}", path)),
            None => Ok(ModelConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_params_mapping() {
        let config = TrainingEnvConfig {
            epochs: 7,
            batch_size: 4,
            seed: 9,
            validation_split: 0.1,
            ..TrainingEnvConfig::default()
        };

        let params = config.training_params();
        assert_eq!(params.epochs, 7);
        assert_eq!(params.batch_size, 4);
        assert_eq!(params.seed, 9);
        assert!(params.shuffle);
    }

    #[test]
    fn test_default_model_config_without_file() {
        let config = TrainingEnvConfig::default();
        assert_eq!(config.model_config().unwrap(), ModelConfig::default());
    }
}
