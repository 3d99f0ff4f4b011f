//! Sliding-window sample generation.
//!
//! Every window of `window_length` consecutive values is paired with the label
//! of the point immediately after it, so a series of N points yields
//! `N - window_length` samples (or none when `N <= window_length`).

use crate::domain::errors::DataError;
use crate::domain::series::LabeledWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceBuilder {
    window_length: usize,
}

impl SequenceBuilder {
    pub fn new(window_length: usize) -> Result<Self, DataError> {
        if window_length == 0 {
            return Err(DataError::ZeroWindowLength);
        }
        Ok(Self { window_length })
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    /// Number of samples a series of `rows` points produces
    pub fn sample_count(&self, rows: usize) -> usize {
        rows.saturating_sub(self.window_length)
    }

    /// Builds (window, next label) pairs.
    ///
    /// Sample `i` holds `values[i..i + W]` and `labels[i + W]`.
    pub fn build<L: Clone>(
        &self,
        values: &[f64],
        labels: &[L],
    ) -> Result<Vec<LabeledWindow<L>>, DataError> {
        if values.len() != labels.len() {
            return Err(DataError::LengthMismatch {
                values: values.len(),
                labels: labels.len(),
            });
        }

        let samples = values
            .windows(self.window_length)
            .zip(labels.iter().skip(self.window_length))
            .map(|(window, label)| LabeledWindow {
                window: window.to_vec(),
                label: label.clone(),
            })
            .collect();

        Ok(samples)
    }
}
