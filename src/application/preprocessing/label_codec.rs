//! Bijection between trend label strings and dense class indices.

use crate::domain::errors::DataError;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Classes are stored sorted, so `down`, `stable`, `up` encode to 0, 1, 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCodec {
    classes: Vec<String>,
}

impl LabelCodec {
    pub fn fit<I, S>(labels: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        classes.sort();
        classes.dedup();

        if classes.is_empty() {
            return Err(DataError::EmptySeries);
        }

        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn encode(&self, label: &str) -> Result<usize, DataError> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map_err(|_| DataError::UnknownLabel {
                label: label.to_string(),
                known: self.classes.clone(),
            })
    }

    pub fn decode(&self, index: usize) -> Result<&str, DataError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(DataError::UnknownClass {
                index,
                classes: self.classes.len(),
            })
    }

    pub fn encode_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>, DataError> {
        labels.iter().map(|l| self.encode(l.as_ref())).collect()
    }

    pub fn one_hot(&self, index: usize) -> Result<Array1<f64>, DataError> {
        if index >= self.classes.len() {
            return Err(DataError::UnknownClass {
                index,
                classes: self.classes.len(),
            });
        }
        let mut encoded = Array1::zeros(self.classes.len());
        encoded[index] = 1.0;
        Ok(encoded)
    }
}
