use crate::domain::errors::ModelError;
use ndarray::{Array1, ArrayView2};

/// Interface for sequence classification models
pub trait TrendClassifier: Send + Sync {
    /// Class probabilities for one normalized window shaped `[timesteps, features]`.
    /// The returned vector sums to 1.
    fn predict_proba(&self, window: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError>;

    /// Number of output classes
    fn num_classes(&self) -> usize;

    /// Get model name/type
    fn name(&self) -> &str;
}
