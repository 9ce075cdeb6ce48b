// ============================================================
// Layer 3 — Sentiment Label
// ============================================================
// The classification target. The discriminants double as the
// class indices the model is trained on and predicts:
//
//   0 → Negative   (score ≤ 2)
//   1 → Neutral    (score = 3)
//   2 → Positive   (score > 3)
//
// Reference: Rust Book §6 (Enums and Pattern Matching)

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    Negative = 0,
    Neutral  = 1,
    Positive = 2,
}

impl Sentiment {
    /// Number of classes the model head produces.
    pub const COUNT: usize = 3;

    /// All labels in class-index order.
    pub const ALL: [Sentiment; Self::COUNT] =
        [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// Derive the label from a review score.
    ///
    /// The label depends on the score alone:
    ///   score ≤ 2 → Negative, score = 3 → Neutral, score > 3 → Positive
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s <= 2 => Sentiment::Negative,
            3           => Sentiment::Neutral,
            _           => Sentiment::Positive,
        }
    }

    /// Map a class index back to a label. Only 0, 1 and 2 are valid.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The class index used for training targets and arg-max output.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name, also the `sentiment` field of API responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral  => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Sentiment::Negative => "😞",
            Sentiment::Neutral  => "😐",
            Sentiment::Positive => "😊",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
