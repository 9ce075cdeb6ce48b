// ============================================================
// Layer 4 — Text Encoder (Tokenizer Adapter)
// ============================================================
// Turns review text into the fixed-length integer sequences the
// model consumes:
//
//   "Great film!"  →  input_ids:      [7, 12, 1, 0, 0, ..., 0]
//                     attention_mask: [1,  1, 1, 0, 0, ..., 0]
//                                      └── max_len entries ──┘
//
// Sub-word segmentation is delegated to the `tokenizers` crate.
// This adapter only enforces the length contract:
//   - longer sequences are truncated to max_len
//   - shorter sequences are right-padded with [PAD] to max_len
//
// Reference: tokenizers crate documentation

use tokenizers::Tokenizer;

use crate::data::preprocessor::Preprocessor;
use crate::domain::error::PipelineError;
use crate::infra::tokenizer_store::{vocab_len, PAD_TOKEN};

/// Default sequence length for training and inference.
pub const DEFAULT_MAX_SEQ_LEN: usize = 128;

/// One encoded text. Both vectors are exactly `max_len` long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
}

#[derive(Clone)]
pub struct TextEncoder {
    tokenizer:    Tokenizer,
    max_len:      usize,
    pad_id:       u32,
    preprocessor: Option<Preprocessor>,
}

impl TextEncoder {
    pub fn new(tokenizer: Tokenizer, max_len: usize) -> Self {
        let pad_id = tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0);
        Self { tokenizer, max_len, pad_id, preprocessor: None }
    }

    /// Run the text through `Preprocessor::clean` before tokenising.
    pub fn with_cleaning(mut self, clean: bool) -> Self {
        self.preprocessor = clean.then(Preprocessor::new);
        self
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn cleans_text(&self) -> bool {
        self.preprocessor.is_some()
    }

    pub fn vocab_len(&self) -> usize {
        vocab_len(&self.tokenizer)
    }

    pub fn encode(&self, text: &str) -> Result<EncodedText, PipelineError> {
        let cleaned;
        let text = match &self.preprocessor {
            Some(p) => {
                cleaned = p.clean(text);
                cleaned.as_str()
            }
            None => text,
        };

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(PipelineError::Inference)?;

        Ok(self.fit(encoding.get_ids(), encoding.get_attention_mask()))
    }

    pub fn encode_batch(&self, texts: &[&str]) -> Result<Vec<EncodedText>, PipelineError> {
        texts.iter().map(|t| self.encode(t)).collect()
    }

    /// Truncate or right-pad to exactly `max_len`.
    fn fit(&self, ids: &[u32], mask: &[u32]) -> EncodedText {
        let kept = ids.len().min(self.max_len);

        let mut input_ids = ids[..kept].to_vec();
        input_ids.resize(self.max_len, self.pad_id);

        let mut attention_mask = mask[..kept.min(mask.len())].to_vec();
        attention_mask.resize(self.max_len, 0);

        EncodedText { input_ids, attention_mask }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::build_word_level;

    fn encoder(max_len: usize) -> TextEncoder {
        let tok = build_word_level(&["the film was good", "the plot was bad"], 100).unwrap();
        TextEncoder::new(tok, max_len)
    }

    #[test]
    fn test_short_text_is_right_padded() {
        let enc = encoder(8).encode("the film").unwrap();
        assert_eq!(enc.input_ids.len(), 8);
        assert_eq!(enc.attention_mask, vec![1, 1, 0, 0, 0, 0, 0, 0]);
        assert!(enc.input_ids[2..].iter().all(|&id| id == 0));
    }

    #[test]
    fn test_long_text_is_truncated() {
        let long = "the film was good ".repeat(50);
        let enc  = encoder(16).encode(&long).unwrap();
        assert_eq!(enc.input_ids.len(), 16);
        assert_eq!(enc.attention_mask, vec![1; 16]);
    }

    #[test]
    fn test_never_exceeds_max_len() {
        let e = encoder(5);
        for text in ["", "bad", "the plot was bad", "the plot was bad and the film was good too"] {
            let out = e.encode(text).unwrap();
            assert_eq!(out.input_ids.len(), 5);
            assert_eq!(out.attention_mask.len(), 5);
        }
    }

    #[test]
    fn test_batch_matches_single() {
        let e = encoder(6);
        let batch = e.encode_batch(&["the film", "bad"]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], e.encode("bad").unwrap());
    }

    #[test]
    fn test_cleaning_is_applied_before_tokenising() {
        let e = encoder(4).with_cleaning(true);
        assert!(e.cleans_text());
        // "good!!!" only matches the vocabulary once punctuation is gone
        let plain   = encoder(4).encode("good!!!").unwrap();
        let cleaned = e.encode("good!!!").unwrap();
        assert_eq!(cleaned.input_ids[0], e.encode("good").unwrap().input_ids[0]);
        assert_ne!(plain.input_ids, cleaned.input_ids);
    }
}
