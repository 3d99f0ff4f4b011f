//! Recurrent classifier built on `ndarray`.

pub mod config;
pub mod dense;
pub mod loss;
pub(crate) mod math;
pub mod lstm;
pub mod network;
pub mod optimizer;

pub use config::ModelConfig;
pub use network::{ForwardPass, SequenceClassifier};
pub use optimizer::Adam;
