use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The trend labels the bundled data set is annotated with.
pub const KNOWN_TRENDS: &[&str] = &["down", "stable", "up"];

/// One row of the raw input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub value: f64,
    pub trend: String,
}

impl SeriesPoint {
    pub fn new(value: f64, trend: impl Into<String>) -> Self {
        Self {
            value,
            trend: trend.into(),
        }
    }
}

/// A window of consecutive values and the label of the point right after it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledWindow<L> {
    pub window: Vec<f64>,
    pub label: L,
}

/// Result of classifying a single input window.
#[derive(Debug, Clone)]
pub struct TrendPrediction {
    pub predicted_trend: String,
    pub class_index: usize,
    /// Probability per label, keyed in codec order
    pub probabilities: BTreeMap<String, f64>,
    pub predicted_at: DateTime<Local>,
}

impl TrendPrediction {
    /// Probability assigned to the predicted label
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .get(&self.predicted_trend)
            .copied()
            .unwrap_or(0.0)
    }
}
