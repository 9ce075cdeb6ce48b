// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Every failure the loader, splitter, tokenizer adapter and
// inference service can report. Callers match on the kind;
// orchestration code wraps these inside anyhow::Error and
// adds context as they travel up.
//
// Reference: Rust Book §9 (Recoverable Errors with Result)
//            thiserror crate documentation

use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause carried by failures that originate in a third-party crate.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Dataset file or model directory is missing.
    #[error("'{}' does not exist", .0.display())]
    NotFound(PathBuf),

    /// A required dataset column is absent from the header row.
    #[error("dataset must contain a '{0}' column")]
    Schema(String),

    #[error("dataset is too small for training: {found} records, need at least {required}")]
    InsufficientData { found: usize, required: usize },

    /// The requested split would leave one side with no records.
    #[error("splitting {total} records leaves the {subset} set empty")]
    EmptySplit { total: usize, subset: &'static str },

    #[error("validation fraction must be strictly between 0 and 1, got {0}")]
    InvalidFraction(f64),

    #[error("cannot read CSV '{}'", path.display())]
    Csv {
        path:   PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Tokenization or forward-pass failure, cause attached.
    #[error("inference failed: {0}")]
    Inference(#[source] BoxError),
}

impl PipelineError {
    pub fn inference(cause: impl Into<BoxError>) -> Self {
        PipelineError::Inference(cause.into())
    }
}
