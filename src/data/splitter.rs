// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles records with a seeded RNG and splits them into:
//   - Training set:   used to update model weights
//   - Validation set: used to pick the best epoch and to
//                     report accuracy / precision / recall / F1
//
// Guarantees:
//   - train ∩ validation = ∅ and train ∪ validation = input
//   - same input + same seed → same partition
//   - validation is never empty
//
// Validation size = ceil(n × fraction), so any fraction in
// (0, 1) yields at least one record; a tiny fraction behaves
// like 1/n. A fraction so large that nothing is left for
// training is an error.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom on a
// StdRng seeded from a u64.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::error::PipelineError;

pub const DEFAULT_VALIDATION_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_MIN_RECORDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splitter {
    validation_fraction: f64,
    seed:                u64,
    min_records:         usize,
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDATION_FRACTION, DEFAULT_SEED)
    }
}

impl Splitter {
    pub fn new(validation_fraction: f64, seed: u64) -> Self {
        Self { validation_fraction, seed, min_records: DEFAULT_MIN_RECORDS }
    }

    /// Smallest dataset `split` accepts.
    pub fn with_min_records(mut self, min_records: usize) -> Self {
        self.min_records = min_records;
        self
    }

    /// Number of validation records for a dataset of `total` records.
    pub fn validation_len(&self, total: usize) -> Result<usize, PipelineError> {
        let fraction = self.validation_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(PipelineError::InvalidFraction(fraction));
        }
        if total < self.min_records {
            return Err(PipelineError::InsufficientData {
                found:    total,
                required: self.min_records,
            });
        }
        if total == 0 {
            return Err(PipelineError::EmptySplit { total, subset: "validation" });
        }

        // total >= 1 and fraction > 0, so this is at least 1
        let val_len = ((total as f64) * fraction).ceil() as usize;

        if val_len >= total {
            return Err(PipelineError::EmptySplit { total, subset: "training" });
        }
        Ok(val_len)
    }

    /// Shuffle `records` and split into (train, validation).
    pub fn split<T>(&self, mut records: Vec<T>) -> Result<(Vec<T>, Vec<T>), PipelineError> {
        let total   = records.len();
        let val_len = self.validation_len(total)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        records.shuffle(&mut rng);

        // split_off(n) leaves [0..n] in `records` and returns [n..total]
        let validation = records.split_off(total - val_len);

        tracing::debug!(
            "Dataset split: {} training, {} validation (seed {})",
            records.len(),
            validation.len(),
            self.seed,
        );

        Ok((records, validation))
    }
}
