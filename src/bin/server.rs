//! Trend prediction HTTP server.
//!
//! Loads the trained artifact once and serves `GET /predict?input_data=20,21,23`.
//!
//! # Usage
//! ```sh
//! PORT=5000 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `ARTIFACT_PATH` - Trained model bundle (default: models/trend_classifier.json)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Bind port (default: 5000)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use trendcast::application::inference::InferenceService;
use trendcast::config::ServerEnvConfig;
use trendcast::infrastructure::ArtifactStore;
use trendcast::infrastructure::http::{self, AppState};
use trendcast::infrastructure::observability::init_logging;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    artifact: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    info!("trendcast server {} starting...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let mut config = ServerEnvConfig::from_env()?;
    if let Some(artifact) = args.artifact {
        config.artifact_path = artifact;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let bundle = ArtifactStore::new(&config.artifact_path)
        .load()
        .context("Failed to load model artifact")?;
    let service = InferenceService::from_bundle(bundle).context("Artifact is not usable")?;
    let state = AppState::new(Arc::new(service));

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    http::serve(listener, state, http::shutdown_signal()).await
}
