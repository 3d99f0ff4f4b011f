//! One-off prediction from the command line.
//!
//! ```sh
//! cargo run --bin predict -- --input "20,21,24"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use trendcast::application::inference::{InferenceService, parse_input_window};
use trendcast::config::TrainingEnvConfig;
use trendcast::infrastructure::ArtifactStore;
use trendcast::infrastructure::observability::init_logging;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Window of recent values, e.g. "20,21,24"
    #[arg(long)]
    input: String,

    /// Trained artifact (defaults to ARTIFACT_PATH)
    #[arg(long)]
    artifact: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args = Args::parse();
    let artifact_path = match args.artifact {
        Some(path) => path,
        None => TrainingEnvConfig::from_env()?.artifact_path,
    };

    let bundle = ArtifactStore::new(&artifact_path)
        .load()
        .context("Failed to load model artifact")?;
    let service = InferenceService::from_bundle(bundle)?;

    let window = parse_input_window(&args.input)?;
    let prediction = service.predict(&window)?;

    println!("Input window:    {:?}", window);
    println!("Predicted trend: {}", prediction.predicted_trend);
    println!("Probabilities:");
    for (label, probability) in &prediction.probabilities {
        println!("  {:<8} {:>7.2}%", label, probability * 100.0);
    }
    Ok(())
}
