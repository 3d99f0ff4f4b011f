use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a raw series into training samples
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Series is empty")]
    EmptySeries,

    #[error("Non-finite value {value} at row {row}")]
    NonFiniteValue { row: usize, value: f64 },

    #[error("Window length must be at least 1")]
    ZeroWindowLength,

    #[error("Length mismatch: {values} values but {labels} labels")]
    LengthMismatch { values: usize, labels: usize },

    #[error("Insufficient data: {rows} rows cannot form a window of {window_length} plus a label")]
    InsufficientData { rows: usize, window_length: usize },

    #[error("Unknown trend label '{label}' (known: {known:?})")]
    UnknownLabel { label: String, known: Vec<String> },

    #[error("Class index {index} out of range for {classes} classes")]
    UnknownClass { index: usize, classes: usize },
}

/// Errors related to the network definition and tensor shapes
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid model configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Invalid training parameters: {reason}")]
    InvalidTraining { reason: String },
}

/// Errors related to prediction requests
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Input window has {actual} values, model was trained on windows of {expected}")]
    WindowLengthMismatch { expected: usize, actual: usize },

    #[error("Model produced {outputs} outputs for {classes} known classes")]
    ClassCountMismatch { outputs: usize, classes: usize },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Errors related to loading or storing the trained artifact bundle
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("Artifact at {path:?} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Unsupported artifact format v{found}, expected v{expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Artifact I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_formatting() {
        let error = DataError::InsufficientData {
            rows: 3,
            window_length: 3,
        };

        let msg = error.to_string();
        assert!(msg.contains("3 rows"));
        assert!(msg.contains("window of 3"));
    }

    #[test]
    fn test_window_mismatch_formatting() {
        let error = InferenceError::WindowLengthMismatch {
            expected: 3,
            actual: 5,
        };

        let msg = error.to_string();
        assert!(msg.contains("5 values"));
        assert!(msg.contains("windows of 3"));
    }

    #[test]
    fn test_unknown_label_lists_known_classes() {
        let error = DataError::UnknownLabel {
            label: "sideways".to_string(),
            known: vec!["down".to_string(), "up".to_string()],
        };

        let msg = error.to_string();
        assert!(msg.contains("sideways"));
        assert!(msg.contains("down"));
    }
}
