//! Prediction path: raw window → scaled tensor → class probabilities → label.

use crate::application::artifact::ArtifactBundle;
use crate::application::model::math::argmax;
use crate::application::preprocessing::{LabelCodec, MinMaxScaler};
use crate::domain::errors::InferenceError;
use crate::domain::ports::TrendClassifier;
use crate::domain::series::TrendPrediction;
use chrono::Local;
use ndarray::Array2;
use std::collections::BTreeMap;
use tracing::debug;

/// Read-only prediction handle, built once at startup and shared across requests.
pub struct InferenceService {
    classifier: Box<dyn TrendClassifier>,
    scaler: MinMaxScaler,
    codec: LabelCodec,
    window_length: usize,
}

impl std::fmt::Debug for InferenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceService")
            .field("classifier", &self.classifier.name())
            .field("classes", &self.codec.classes())
            .field("window_length", &self.window_length)
            .finish()
    }
}

impl InferenceService {
    pub fn new(
        classifier: Box<dyn TrendClassifier>,
        scaler: MinMaxScaler,
        codec: LabelCodec,
        window_length: usize,
    ) -> Result<Self, InferenceError> {
        if classifier.num_classes() != codec.len() {
            return Err(InferenceError::ClassCountMismatch {
                outputs: classifier.num_classes(),
                classes: codec.len(),
            });
        }
        if window_length == 0 {
            return Err(InferenceError::InvalidInput {
                reason: "window length must be at least 1".to_string(),
            });
        }

        Ok(Self {
            classifier,
            scaler,
            codec,
            window_length,
        })
    }

    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self, InferenceError> {
        bundle.check_consistency()?;
        Self::new(
            Box::new(bundle.model),
            bundle.scaler,
            bundle.codec,
            bundle.window_length,
        )
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    pub fn classes(&self) -> &[String] {
        self.codec.classes()
    }

    pub fn model_name(&self) -> &str {
        self.classifier.name()
    }

    /// Classifies one raw (unscaled) window of exactly `window_length` values.
    pub fn predict(&self, raw_window: &[f64]) -> Result<TrendPrediction, InferenceError> {
        if raw_window.len() != self.window_length {
            return Err(InferenceError::WindowLengthMismatch {
                expected: self.window_length,
                actual: raw_window.len(),
            });
        }
        if let Some(value) = raw_window.iter().find(|v| !v.is_finite()) {
            return Err(InferenceError::InvalidInput {
                reason: format!("non-finite value {}", value),
            });
        }

        let scaled = self.scaler.transform(raw_window);
        let tensor = Array2::from_shape_vec((self.window_length, 1), scaled).map_err(|e| {
            InferenceError::InvalidInput {
                reason: format!("cannot shape window: {}", e),
            }
        })?;

        let probabilities = self.classifier.predict_proba(tensor.view())?;
        if probabilities.len() != self.codec.len() {
            return Err(InferenceError::ClassCountMismatch {
                outputs: probabilities.len(),
                classes: self.codec.len(),
            });
        }

        let class_index = argmax(probabilities.view());
        let predicted_trend = self.codec.decode(class_index)?.to_string();

        let probabilities: BTreeMap<String, f64> = self
            .codec
            .classes()
            .iter()
            .cloned()
            .zip(probabilities.iter().copied())
            .collect();

        debug!(
            "Predicted '{}' for window {:?} ({:?})",
            predicted_trend, raw_window, probabilities
        );

        Ok(TrendPrediction {
            predicted_trend,
            class_index,
            probabilities,
            predicted_at: Local::now(),
        })
    }
}

/// Parses `"20,21,23"`, `"20 21 23"` or `"[20, 21, 23]"` into values.
///
/// Every comma-separated item must hold at least one number.
pub fn parse_input_window(raw: &str) -> Result<Vec<f64>, InferenceError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    if inner.trim().is_empty() {
        return Err(InferenceError::InvalidInput {
            reason: "input window is empty".to_string(),
        });
    }

    let mut values = Vec::new();
    for (position, item) in inner.split(',').enumerate() {
        if item.trim().is_empty() {
            return Err(InferenceError::InvalidInput {
                reason: format!("empty item at position {}", position + 1),
            });
        }
        for token in item.split_whitespace() {
            values.push(parse_value(token)?);
        }
    }
    Ok(values)
}

fn parse_value(token: &str) -> Result<f64, InferenceError> {
    let value: f64 = token.parse().map_err(|_| InferenceError::InvalidInput {
        reason: format!("'{}' is not a number", token),
    })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InferenceError::InvalidInput {
            reason: format!("'{}' is not a finite number", token),
        })
    }
}
