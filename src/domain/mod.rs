// Domain-specific error types
pub mod errors;

// Port interfaces
pub mod ports;

// Raw series, windows and predictions
pub mod series;
