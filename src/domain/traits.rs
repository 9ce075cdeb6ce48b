// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application and web layers program against these traits
// rather than the concrete CSV loader or Burn-backed model:
//
//   - CsvReviewLoader implements RecordSource
//   - Mutex<Inferencer<B>> implements SentimentPredictor
//
// Tests substitute in-memory implementations of both.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::{error::PipelineError, review::LabeledRecord, sentiment::Sentiment};

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce labelled review records.
pub trait RecordSource {
    /// Load every usable record, in source order.
    fn load(&self) -> Result<Vec<LabeledRecord>, PipelineError>;
}

// ─── SentimentPredictor ───────────────────────────────────────────────────────
/// Any component that can classify a single piece of text.
///
/// Send + Sync so one loaded instance can be shared by all
/// request handlers behind an Arc.
pub trait SentimentPredictor: Send + Sync {
    fn predict(&self, text: &str) -> Result<Sentiment, PipelineError>;
}
