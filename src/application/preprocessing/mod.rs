//! Data preparation: windowing, normalization and label encoding.

pub mod dataset;
pub mod label_codec;
pub mod scaler;
pub mod sequence_builder;

pub use dataset::PreparedDataset;
pub use label_codec::LabelCodec;
pub use scaler::MinMaxScaler;
pub use sequence_builder::SequenceBuilder;
