// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the raw CSV file and tensor batches:
//
//   dataset.csv
//       │
//       ▼
//   CsvReviewLoader   → reads rows, derives labels from scores
//       │
//       ▼
//   Splitter          → seeded train / validation partition
//       │
//       ▼
//   TextEncoder       → (optional Preprocessor) + tokenizer,
//       │               fixed-length ids and attention mask
//       ▼
//   SentimentDataset  → implements Burn's Dataset trait
//       │
//       ▼
//   SentimentBatcher  → stacks samples into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads labelled reviews from CSV
pub mod loader;

/// Optional lowercase / strip-punctuation cleaning
pub mod preprocessor;

/// Seeded train/validation partition
pub mod splitter;

/// Tokenizer adapter: fixed-length ids + attention mask
pub mod encoder;

/// Implements Burn's Dataset trait for encoded samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
