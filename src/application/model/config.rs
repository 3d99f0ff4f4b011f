//! Declarative description of the recurrent classifier.

use crate::domain::errors::ModelError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Network architecture and optimizer settings.
///
/// Every field has a default, so a TOML file only lists what it overrides:
///
/// ```toml
/// lstm_units = [32]
/// dropout = 0.1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Stacked LSTM layers; every layer but the last feeds its full sequence on
    pub lstm_units: Vec<usize>,
    /// Inverted dropout rate after each LSTM layer (training only)
    pub dropout: f64,
    /// Hidden ReLU dense layers between the last LSTM and the softmax output
    pub dense_units: Vec<usize>,
    pub learning_rate: f64,
    /// Global-norm gradient clipping threshold
    pub gradient_clip: Option<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            lstm_units: vec![64, 64],
            dropout: 0.2,
            dense_units: vec![32],
            learning_rate: 0.001,
            gradient_clip: None,
        }
    }
}

impl ModelConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse model config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model config {:?}", path))?;
        Self::from_toml_str(&content)
    }

    pub fn with_lstm_units(mut self, units: Vec<usize>) -> Self {
        self.lstm_units = units;
        self
    }

    pub fn with_dense_units(mut self, units: Vec<usize>) -> Self {
        self.dense_units = units;
        self
    }

    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_gradient_clip(mut self, clip: f64) -> Self {
        self.gradient_clip = Some(clip);
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |reason: String| Err(ModelError::InvalidConfig { reason });

        if self.lstm_units.is_empty() {
            return invalid("at least one LSTM layer is required".to_string());
        }
        if self.lstm_units.iter().chain(&self.dense_units).any(|&u| u == 0) {
            return invalid("layer unit counts must be positive".to_string());
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return invalid(format!("dropout {} must be in [0, 1)", self.dropout));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return invalid(format!(
                "learning rate {} must be positive",
                self.learning_rate
            ));
        }
        if let Some(clip) = self.gradient_clip {
            if !(clip > 0.0) {
                return invalid(format!("gradient clip {} must be positive", clip));
            }
        }
        Ok(())
    }
}
