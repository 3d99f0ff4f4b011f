//! Everything a trained run hands over to inference.

use crate::application::model::SequenceClassifier;
use crate::application::preprocessing::{LabelCodec, MinMaxScaler, PreparedDataset};
use crate::application::training::TrainingReport;
use crate::domain::errors::InferenceError;
use crate::domain::ports::TrendClassifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Model weights together with the exact scaler and codec fitted on its training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub window_length: usize,
    pub scaler: MinMaxScaler,
    pub codec: LabelCodec,
    pub model: SequenceClassifier,
    pub report: Option<TrainingReport>,
}

impl ArtifactBundle {
    pub fn new(
        model: SequenceClassifier,
        dataset: &PreparedDataset,
        report: Option<TrainingReport>,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            created_at: Utc::now(),
            window_length: dataset.window_length,
            scaler: dataset.scaler.clone(),
            codec: dataset.codec.clone(),
            model,
            report,
        }
    }

    /// The codec and the model output must describe the same classes.
    pub fn check_consistency(&self) -> Result<(), InferenceError> {
        if self.model.num_classes() != self.codec.len() {
            return Err(InferenceError::ClassCountMismatch {
                outputs: self.model.num_classes(),
                classes: self.codec.len(),
            });
        }
        if self.window_length == 0 {
            return Err(InferenceError::InvalidInput {
                reason: "artifact window length is 0".to_string(),
            });
        }
        Ok(())
    }
}
