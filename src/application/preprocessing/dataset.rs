//! Raw series → normalized, labeled tensors ready for training.

use super::label_codec::LabelCodec;
use super::scaler::MinMaxScaler;
use super::sequence_builder::SequenceBuilder;
use crate::domain::errors::DataError;
use crate::domain::series::{KNOWN_TRENDS, SeriesPoint};
use ndarray::{Array2, Array3};
use tracing::{info, warn};

/// Supervised samples plus the fitted state needed to reproduce them at inference.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// `[samples, window_length, 1]`
    pub inputs: Array3<f64>,
    /// One-hot `[samples, classes]`
    pub targets: Array2<f64>,
    pub class_indices: Vec<usize>,
    pub scaler: MinMaxScaler,
    pub codec: LabelCodec,
    pub window_length: usize,
}

impl PreparedDataset {
    /// Fits scaler and codec over the whole series, then windows the scaled values.
    pub fn prepare(series: &[SeriesPoint], window_length: usize) -> Result<Self, DataError> {
        let builder = SequenceBuilder::new(window_length)?;
        if series.is_empty() {
            return Err(DataError::EmptySeries);
        }
        if builder.sample_count(series.len()) == 0 {
            return Err(DataError::InsufficientData {
                rows: series.len(),
                window_length,
            });
        }

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let labels: Vec<&str> = series.iter().map(|p| p.trend.as_str()).collect();

        let codec = LabelCodec::fit(&labels)?;
        for class in codec.classes() {
            if !KNOWN_TRENDS.contains(&class.as_str()) {
                warn!("Unexpected trend label '{}' in series", class);
            }
        }
        let encoded = codec.encode_all(&labels)?;

        let scaler = MinMaxScaler::fit(&values)?;
        let scaled = scaler.transform(&values);

        let samples = builder.build(&scaled, &encoded)?;

        let n = samples.len();
        let mut inputs = Array3::zeros((n, window_length, 1));
        let mut targets = Array2::zeros((n, codec.len()));
        let mut class_indices = Vec::with_capacity(n);

        for (i, sample) in samples.iter().enumerate() {
            for (t, &value) in sample.window.iter().enumerate() {
                inputs[[i, t, 0]] = value;
            }
            targets.row_mut(i).assign(&codec.one_hot(sample.label)?);
            class_indices.push(sample.label);
        }

        info!(
            "Prepared {} samples (window={}, classes={:?}, range=[{}, {}])",
            n,
            window_length,
            codec.classes(),
            scaler.data_min(),
            scaler.data_max()
        );

        Ok(Self {
            inputs,
            targets,
            class_indices,
            scaler,
            codec,
            window_length,
        })
    }

    pub fn len(&self) -> usize {
        self.class_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.class_indices.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.codec.len()
    }

    /// Sample count per label, in codec order
    pub fn class_distribution(&self) -> Vec<(String, usize)> {
        let mut counts = vec![0usize; self.codec.len()];
        for &index in &self.class_indices {
            counts[index] += 1;
        }
        self.codec
            .classes()
            .iter()
            .cloned()
            .zip(counts)
            .collect()
    }
}
