//! HTTP surface for the inference service.

pub mod error;
pub mod routes;

use crate::application::inference::InferenceService;
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{ApiError, ErrorResponse};
pub use routes::{MessageResponse, PredictResponse};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InferenceService>,
}

impl AppState {
    pub fn new(service: Arc<InferenceService>) -> Self {
        Self { service }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/predict", get(routes::predict))
        .route("/test", get(routes::service_check))
        .route("/health", get(routes::liveness))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves until `shutdown` resolves, then drains in-flight requests.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(
        "Serving {} (window {}, classes {:?}) on http://{}",
        state.service.model_name(),
        state.service.window_length(),
        state.service.classes(),
        addr
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => tracing::warn!("Failed to listen for Ctrl+C: {}", e),
    }
}
