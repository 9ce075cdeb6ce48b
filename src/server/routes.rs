// ============================================================
// Layer 1 — HTTP Routes
// ============================================================
//   POST /predict   {"text": "..."}  → {"sentiment": "Positive"}
//   GET  /health                     → {"status": "ok"}
//   GET  /                           → browser page
//
// Every failure answers with a single {"error": "..."} field:
//   400  missing / blank text, or a body that is not valid JSON
//   500  the model failed
//
// The forward pass is CPU/GPU bound, so it runs on tokio's
// blocking pool instead of an async worker thread.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::predict_use_case::{is_blank, EMPTY_TEXT_MESSAGE};
use crate::domain::sentiment::Sentiment;
use crate::server::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub sentiment: Sentiment,
}

/// Error response carrying its status code.
#[derive(Debug)]
pub struct ApiError {
    status:  StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    })?;

    let text = match req.text {
        Some(text) if !is_blank(&text) => text,
        _ => return Err(ApiError::bad_request(EMPTY_TEXT_MESSAGE)),
    };

    let predictor = state.predictor.clone();
    let sentiment = tokio::task::spawn_blocking(move || predictor.predict(&text))
        .await
        .map_err(|e| {
            tracing::error!("Prediction task panicked: {e}");
            ApiError::internal(e.to_string())
        })?
        .map_err(|e| {
            tracing::error!("Prediction failed: {e}");
            ApiError::internal(e.to_string())
        })?;

    Ok(Json(PredictResponse { sentiment }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
