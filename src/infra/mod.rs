// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence and reporting shared by training and serving:
//
//   checkpoint.rs      — Model directory layout
//                        Weights via Burn's CompactRecorder,
//                        manifest via serde_json, per-epoch
//                        checkpoints.
//
//   tokenizer_store.rs — Tokenizer resolution and persistence
//                        Base model → pretrained file → word-level
//                        vocabulary built from the corpus.
//
//   metrics.rs         — Accuracy / weighted precision, recall, F1,
//                        the per-epoch CSV log and the final
//                        four-line report.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model artifact saving and loading
pub mod checkpoint;

/// Tokenizer resolution, saving, and loading
pub mod tokenizer_store;

/// Validation metrics, CSV log and report
pub mod metrics;
