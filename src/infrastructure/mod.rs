pub mod artifact_store;
pub mod http;
pub mod observability;
pub mod series_reader;

pub use artifact_store::ArtifactStore;
pub use series_reader::read_series;
