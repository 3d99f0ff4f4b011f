//! Min-max normalization fitted once on the training values.

use crate::domain::errors::DataError;
use serde::{Deserialize, Serialize};

/// Maps the observed `[data_min, data_max]` onto `[range_min, range_max]`.
///
/// Bounds are fixed once fitted and are persisted with the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: f64,
    data_max: f64,
    range_min: f64,
    range_max: f64,
}

impl MinMaxScaler {
    /// Fits onto the default `[0, 1]` target range
    pub fn fit(values: &[f64]) -> Result<Self, DataError> {
        Self::fit_with_range(values, 0.0, 1.0)
    }

    pub fn fit_with_range(
        values: &[f64],
        range_min: f64,
        range_max: f64,
    ) -> Result<Self, DataError> {
        if values.is_empty() {
            return Err(DataError::EmptySeries);
        }
        if let Some((row, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(DataError::NonFiniteValue { row, value });
        }

        let data_min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let data_max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            data_min,
            data_max,
            range_min,
            range_max,
        })
    }

    pub fn data_min(&self) -> f64 {
        self.data_min
    }

    pub fn data_max(&self) -> f64 {
        self.data_max
    }

    /// A constant series has no spread and is treated as a spread of 1.
    fn scale(&self) -> f64 {
        let spread = self.data_max - self.data_min;
        let spread = if spread == 0.0 { 1.0 } else { spread };
        (self.range_max - self.range_min) / spread
    }

    /// Values outside the fitted bounds are not clipped.
    pub fn transform_value(&self, value: f64) -> f64 {
        (value - self.data_min) * self.scale() + self.range_min
    }

    pub fn inverse_transform_value(&self, scaled: f64) -> f64 {
        (scaled - self.range_min) / self.scale() + self.data_min
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform_value(v)).collect()
    }

    pub fn inverse_transform(&self, scaled: &[f64]) -> Vec<f64> {
        scaled
            .iter()
            .map(|&v| self.inverse_transform_value(v))
            .collect()
    }
}
