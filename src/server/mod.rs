// ============================================================
// Layer 1 — Web Server (axum)
// ============================================================
// Loads the trained model once at startup, then serves
// predictions over HTTP:
//
//   state.rs  — AppState, the predictor shared through an Arc
//   routes.rs — /predict, /health and the browser page
//
// Reference: axum documentation (Router, State, extractors)

pub mod routes;
pub mod state;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::application::predict_use_case::PredictUseCase;
use state::AppState;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Settings for the `serve` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    pub bind_addr: String,
    pub model_dir: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/predict", post(routes::predict))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Load the model and serve until the process is stopped.
pub async fn serve(config: ServeConfig) -> Result<()> {
    let model_dir = config.model_dir.clone();
    let use_case = tokio::task::spawn_blocking(move || PredictUseCase::from_model_dir(&model_dir))
        .await
        .context("Model loading task failed")??;

    let app = router(AppState::new(use_case.predictor()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Cannot bind to '{}'", config.bind_addr))?;
    tracing::info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server error")
}
