// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model code lives here: the architecture, the training
// loop, and the inference engine.
//
//   model.rs      — Transformer encoder classifier
//                   • Token and positional embeddings
//                   • Multi-head self-attention with padding mask
//                   • Feed-forward networks (GELU activation)
//                   • Masked mean pooling
//                   • Three-way classification head
//
//   trainer.rs    — The training loop
//                   Forward pass, loss, backward pass, Adam step,
//                   per-epoch validation, checkpoints and
//                   best-model promotion
//
//   inferencer.rs — The inference engine
//                   Loads the model directory, encodes one text,
//                   returns the arg-max sentiment
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need

use burn::backend::{Autodiff, Wgpu};

/// Backend used by the `train` command.
pub type TrainBackend = Autodiff<Wgpu>;

/// Backend used by `predict` and `serve`; no autodiff.
pub type InferBackend = Wgpu;

/// Transformer encoder sentiment classifier
pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Inference engine that loads a model directory and classifies text
pub mod inferencer;
