// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Classifies text with a trained model:
//
//   Step 1: Load weights, manifest and tokenizer  (Layer 6 - infra)
//   Step 2: Reject empty input                    (before the model)
//   Step 3: Forward pass + arg-max                (Layer 5 - ml)
//
// The loaded predictor is shared: the CLI calls classify() once,
// the web server hands predictor() to every request handler.
//
// Reference: Rust Book §16 (Shared-State Concurrency)

use anyhow::{bail, Context, Result};
use burn::backend::wgpu::WgpuDevice;
use std::sync::{Arc, Mutex};

use crate::domain::{sentiment::Sentiment, traits::SentimentPredictor};
use crate::infra::checkpoint::ArtifactStore;
use crate::ml::{inferencer::Inferencer, InferBackend};

/// Message for input that has nothing to classify.
pub const EMPTY_TEXT_MESSAGE: &str = "No text provided";

/// True when `text` is empty or only whitespace.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

pub struct PredictUseCase {
    predictor: Arc<dyn SentimentPredictor>,
}

impl PredictUseCase {
    pub fn new(predictor: Arc<dyn SentimentPredictor>) -> Self {
        Self { predictor }
    }

    /// Load the model directory once on the default GPU backend.
    pub fn from_model_dir(model_dir: &str) -> Result<Self> {
        tracing::info!("Loading model from '{}'", model_dir);
        let inferencer = Inferencer::<InferBackend>::from_artifacts(
            &ArtifactStore::new(model_dir),
            WgpuDevice::default(),
        )
        .with_context(|| format!("Cannot load model from '{model_dir}'. Run `train` first."))?;

        Ok(Self::new(Arc::new(Mutex::new(inferencer))))
    }

    pub fn predictor(&self) -> Arc<dyn SentimentPredictor> {
        Arc::clone(&self.predictor)
    }

    pub fn classify(&self, text: &str) -> Result<Sentiment> {
        if is_blank(text) {
            bail!(EMPTY_TEXT_MESSAGE);
        }
        let sentiment = self
            .predictor
            .predict(text)
            .context("Prediction failed")?;
        tracing::info!("Classified input as {}", sentiment);
        Ok(sentiment)
    }
}
