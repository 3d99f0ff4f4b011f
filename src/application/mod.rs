// Persisted training output
pub mod artifact;

// Prediction path
pub mod inference;

// Recurrent network engine
pub mod model;

// Windowing, scaling and label encoding
pub mod preprocessing;

// Training loop
pub mod training;
