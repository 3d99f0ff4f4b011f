//! Trains the trend classifier and writes the artifact bundle.
//!
//! # Usage
//! ```sh
//! cargo run --bin train -- --data data/time_series_data.csv --epochs 100
//! ```
//!
//! Flags override the matching environment variables (`DATA_PATH`,
//! `ARTIFACT_PATH`, `SEQUENCE_LENGTH`, `EPOCHS`, `BATCH_SIZE`, `TRAINING_SEED`,
//! `VALIDATION_SPLIT`, `MODEL_CONFIG_PATH`).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use trendcast::application::artifact::ArtifactBundle;
use trendcast::application::model::SequenceClassifier;
use trendcast::application::preprocessing::PreparedDataset;
use trendcast::application::training::Trainer;
use trendcast::config::TrainingEnvConfig;
use trendcast::infrastructure::observability::init_logging;
use trendcast::infrastructure::{ArtifactStore, read_series};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the labelled series CSV (`value,trend`)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Where to write the trained artifact
    #[arg(long)]
    artifact: Option<PathBuf>,

    /// Number of past values per sample
    #[arg(long)]
    window_length: Option<usize>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    batch_size: Option<usize>,

    /// Seed for weight init, dropout and shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Trailing fraction of samples held out for validation
    #[arg(long)]
    validation_split: Option<f64>,

    /// TOML file describing the network architecture
    #[arg(long)]
    model_config: Option<PathBuf>,
}

impl Args {
    fn apply(self, mut config: TrainingEnvConfig) -> TrainingEnvConfig {
        if let Some(data) = self.data {
            config.data_path = data;
        }
        if let Some(artifact) = self.artifact {
            config.artifact_path = artifact;
        }
        if let Some(w) = self.window_length {
            config.sequence_length = w;
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(split) = self.validation_split {
            config.validation_split = split;
        }
        if self.model_config.is_some() {
            config.model_config_path = self.model_config;
        }
        config
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args = Args::parse();
    let config = args.apply(TrainingEnvConfig::from_env()?);
    info!("Training configuration: {:?}", config);

    let series = read_series(&config.data_path)?;
    let dataset = PreparedDataset::prepare(&series, config.sequence_length)
        .context("Failed to prepare training data")?;

    info!(
        "Prepared {} samples of window {} ({} classes: {:?})",
        dataset.len(),
        dataset.window_length,
        dataset.num_classes(),
        dataset.codec.classes()
    );
    for (label, count) in dataset.class_distribution() {
        info!(
            "  {:<8} {:>6} ({:.1}%)",
            label,
            count,
            100.0 * count as f64 / dataset.len() as f64
        );
    }

    let model_config = config.model_config()?;
    let mut model = SequenceClassifier::new(model_config, 1, dataset.num_classes(), config.seed)
        .context("Failed to build model")?;
    info!("Model summary:\n{}", model.summary(dataset.window_length));

    let trainer = Trainer::new(config.training_params()).context("Invalid training parameters")?;
    let report = trainer
        .fit(&mut model, dataset.inputs.view(), dataset.targets.view())
        .context("Training failed")?;

    if let Some(last) = report.final_metrics() {
        info!(
            "Finished after {} epochs: loss {:.4}, accuracy {:.2}%",
            last.epoch,
            last.loss,
            last.accuracy * 100.0
        );
    }

    let bundle = ArtifactBundle::new(model, &dataset, Some(report));
    ArtifactStore::new(&config.artifact_path)
        .save(&bundle)
        .context("Failed to save artifact")?;

    info!("Model trained and saved to {:?}", config.artifact_path);
    Ok(())
}
