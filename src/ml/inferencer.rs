// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Loads a trained artifact once and classifies single texts:
//
//   text → TextEncoder → [1, max_len] ids + mask
//        → forward pass → [1, 3] logits → argmax → Sentiment
//
// The backend carries no autodiff, so no gradients are tracked.
// The Dropout modules are no-ops outside of an autodiff backend.
use burn::prelude::*;
use std::sync::Mutex;

use crate::data::encoder::TextEncoder;
use crate::domain::{error::PipelineError, sentiment::Sentiment, traits::SentimentPredictor};
use crate::infra::checkpoint::ArtifactStore;
use crate::ml::model::{predicted_classes, SentimentClassifier};

pub struct Inferencer<B: Backend> {
    model:   SentimentClassifier<B>,
    encoder: TextEncoder,
    device:  B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: SentimentClassifier<B>, encoder: TextEncoder, device: B::Device) -> Self {
        Self { model, encoder, device }
    }

    /// Rebuild model and encoder from a trained model directory.
    pub fn from_artifacts(store: &ArtifactStore, device: B::Device) -> Result<Self, PipelineError> {
        if !store.is_complete() {
            return Err(PipelineError::NotFound(store.dir().to_path_buf()));
        }

        let (manifest, model) = store
            .load_classifier::<B>(&device)
            .map_err(PipelineError::inference)?;
        let tokenizer = store
            .tokenizer_store()
            .load()
            .map_err(PipelineError::inference)?;

        let encoder = TextEncoder::new(tokenizer, manifest.max_seq_len)
            .with_cleaning(manifest.clean_text);

        Ok(Self::new(model, encoder, device))
    }

    pub fn predict(&self, text: &str) -> Result<Sentiment, PipelineError> {
        let encoded = self.encoder.encode(text)?;
        let seq_len = encoded.input_ids.len();

        let ids: Vec<i32>  = encoded.input_ids.iter().map(|&x| x as i32).collect();
        let mask: Vec<i32> = encoded.attention_mask.iter().map(|&x| x as i32).collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(ids.as_slice(), &self.device)
            .reshape([1, seq_len]);
        let attention_mask = Tensor::<B, 1, Int>::from_ints(mask.as_slice(), &self.device)
            .reshape([1, seq_len]);

        let logits = self.model.forward(input_ids, attention_mask);
        let class  = predicted_classes(logits)
            .first()
            .copied()
            .ok_or_else(|| PipelineError::inference("model returned no prediction"))?;

        let sentiment = Sentiment::from_index(class).ok_or_else(|| {
            PipelineError::inference(format!("class index {class} out of range"))
        })?;

        tracing::debug!("Predicted {} for {} chars of input", sentiment, text.len());
        Ok(sentiment)
    }
}

// Burn modules are not guaranteed to be Sync, so concurrent
// requests share one model behind a lock.
impl<B: Backend> SentimentPredictor for Mutex<Inferencer<B>> {
    fn predict(&self, text: &str) -> Result<Sentiment, PipelineError> {
        let inferencer = self
            .lock()
            .map_err(|_| PipelineError::inference("model lock poisoned"))?;
        inferencer.predict(text)
    }
}
