// ============================================================
// Layer 3 — Review Domain Types
// ============================================================
// A ReviewRecord is one row of the input dataset exactly as it
// was read. A LabeledRecord is what the rest of the pipeline
// works with: the text plus the label derived from the score.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

use crate::domain::sentiment::Sentiment;

/// One dataset row: review text and its numeric score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub content: String,
    pub score:   i64,
}

impl ReviewRecord {
    pub fn new(content: impl Into<String>, score: i64) -> Self {
        Self { content: content.into(), score }
    }

    /// Apply the score → label rule. No other field is consulted.
    pub fn into_labeled(self) -> LabeledRecord {
        LabeledRecord {
            label:   Sentiment::from_score(self.score),
            content: self.content,
        }
    }
}

/// Review text with its classification target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub content: String,
    pub label:   Sentiment,
}

impl LabeledRecord {
    pub fn new(content: impl Into<String>, label: Sentiment) -> Self {
        Self { content: content.into(), label }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_labeled_keeps_content() {
        let rec = ReviewRecord::new("Good film", 5).into_labeled();
        assert_eq!(rec, LabeledRecord::new("Good film", Sentiment::Positive));
    }
}
