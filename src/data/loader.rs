// ============================================================
// Layer 4 — Review Loader
// ============================================================
// Loads the review dataset from a CSV file using the csv crate.
//
// Expected shape:
//   content,score
//   "Loved every minute",5
//   "Fell asleep halfway",2
//
// Any other columns are ignored. Processing steps:
//   1. Fail with NotFound if the file is missing
//   2. Fail with Schema if `content` or `score` is absent
//   3. Drop rows where either field is empty
//   4. Derive the Negative / Neutral / Positive label from score
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use csv::{ReaderBuilder, StringRecord};
use std::path::PathBuf;

use crate::domain::{
    error::PipelineError,
    review::{LabeledRecord, ReviewRecord},
    traits::RecordSource,
};

pub const CONTENT_COLUMN: &str = "content";
pub const SCORE_COLUMN: &str = "score";

/// Loads labelled reviews from a CSV file.
/// Implements the RecordSource trait from Layer 3.
pub struct CsvReviewLoader {
    path: PathBuf,
}

impl CsvReviewLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn csv_error(&self, source: csv::Error) -> PipelineError {
        PipelineError::Csv { path: self.path.clone(), source }
    }
}

impl RecordSource for CsvReviewLoader {
    fn load(&self) -> Result<Vec<LabeledRecord>, PipelineError> {
        if !self.path.exists() {
            return Err(PipelineError::NotFound(self.path.clone()));
        }

        // flexible(true): short rows are treated as missing fields
        // and dropped below instead of aborting the whole load.
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e))?;

        let headers = reader.headers().map_err(|e| self.csv_error(e))?.clone();
        let content_idx = column_index(&headers, CONTENT_COLUMN)?;
        let score_idx   = column_index(&headers, SCORE_COLUMN)?;

        let mut records = Vec::new();
        let mut dropped = 0usize;

        for row in reader.records() {
            let row = row.map_err(|e| self.csv_error(e))?;
            match parse_row(&row, content_idx, score_idx) {
                Some(review) => records.push(review.into_labeled()),
                None         => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::warn!(
                "Dropped {} incomplete rows from '{}'",
                dropped,
                self.path.display()
            );
        }
        tracing::info!(
            "Loaded {} labelled reviews from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, PipelineError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| PipelineError::Schema(name.to_string()))
}

/// Returns None when the row must be dropped.
fn parse_row(row: &StringRecord, content_idx: usize, score_idx: usize) -> Option<ReviewRecord> {
    let content = row.get(content_idx).filter(|c| !c.is_empty())?;
    let raw     = row.get(score_idx).map(str::trim).filter(|s| !s.is_empty())?;
    let score   = parse_score(raw)?;
    Some(ReviewRecord::new(content, score))
}

/// Integer scores, also accepting the `4.0` spelling some exports use.
fn parse_score(raw: &str) -> Option<i64> {
    if let Ok(score) = raw.parse::<i64>() {
        return Some(score);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        _ => {
            tracing::warn!("Skipping row with non-integer score '{}'", raw);
            None
        }
    }
}
