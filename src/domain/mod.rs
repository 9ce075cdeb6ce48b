// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing what the system is
// about: reviews, the three sentiment labels, the error kinds
// every stage can raise, and the seams other layers plug into.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O or network calls
//   - Only plain structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

// The Negative / Neutral / Positive label and its score rule
pub mod sentiment;

// Raw and labelled review rows
pub mod review;

// Typed error taxonomy shared by the pipeline
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
