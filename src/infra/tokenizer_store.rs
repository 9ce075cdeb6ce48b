// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Decides which tokenizer a training run uses and keeps a copy
// of it inside the model directory, so inference always sees
// the vocabulary the weights were trained against.
//
// Resolution order:
//   1. tokenizer.json of the base model being fine-tuned
//   2. a pretrained tokenizer.json given on the command line
//   3. a word-level vocabulary built from the training corpus
//
// Option 3 writes HuggingFace tokenizer JSON by hand and parses
// it back, which sidesteps the trainer/ModelWrapper type
// mismatch in tokenizers 0.15.
//
// Reference: HuggingFace tokenizers JSON format

use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tokenizers::{
    Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer, Tokenizer,
};

pub const TOKENIZER_FILE: &str = "tokenizer.json";

pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";
const SPECIAL_TOKENS: [&str; 4] = [PAD_TOKEN, UNK_TOKEN, "[CLS]", "[SEP]"];

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Load the tokenizer saved in this directory.
    pub fn load(&self) -> Result<Tokenizer> {
        load_file(&self.path())
    }

    /// Write `tokenizer` into this directory, replacing any previous one.
    pub fn save(&self, tokenizer: &Tokenizer) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.path();
        tokenizer
            .save(&path, true)
            .map_err(|e| anyhow::anyhow!("Cannot save tokenizer to '{}': {e}", path.display()))
    }

    /// Pick the tokenizer for a training run. Nothing is written;
    /// the caller saves it once the run is committed.
    pub fn resolve(
        &self,
        base_model: Option<&Path>,
        pretrained: Option<&Path>,
        texts:      &[&str],
        vocab_size: usize,
    ) -> Result<Tokenizer> {
        let tokenizer = if let Some(base) = base_model {
            tracing::info!("Using tokenizer of base model '{}'", base.display());
            TokenizerStore::new(base).load()?
        } else if let Some(file) = pretrained {
            tracing::info!("Using pretrained tokenizer '{}'", file.display());
            load_file(file)?
        } else {
            tracing::info!("Building word-level tokenizer (vocab_size={})", vocab_size);
            build_word_level(texts, vocab_size)?
        };
        Ok(tokenizer)
    }
}

/// Embedding table size needed for this tokenizer: highest id + 1.
pub fn vocab_len(tokenizer: &Tokenizer) -> usize {
    tokenizer
        .get_vocab(true)
        .values()
        .max()
        .map_or(0, |&id| id as usize + 1)
}

fn load_file(path: &Path) -> Result<Tokenizer> {
    if !path.exists() {
        anyhow::bail!("Tokenizer '{}' does not exist", path.display());
    }
    Tokenizer::from_file(path)
        .map_err(|e| anyhow::anyhow!("Cannot load tokenizer from '{}': {e}", path.display()))
}

/// Build a lowercase word-level vocabulary from `texts`.
///
/// Words are counted after the tokenizer's own normalizer and
/// pre-tokenizer, so every stored entry is one the tokenizer can
/// produce ("didn't" is counted as "didn", "'", "t").
///
/// The most frequent words get ids right after the special
/// tokens; ties are broken alphabetically so the same corpus
/// always yields the same ids.
pub fn build_word_level(texts: &[&str], vocab_size: usize) -> Result<Tokenizer> {
    let mut vocab = serde_json::Map::new();
    for (id, token) in SPECIAL_TOKENS.iter().enumerate() {
        vocab.insert(token.to_string(), serde_json::json!(id));
    }

    // Same pipeline, specials only: used to split the corpus.
    let splitter = word_level_tokenizer(vocab.clone())?;

    let mut freq: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in pre_tokenize(&splitter, text)? {
            *freq.entry(word).or_insert(0) += 1;
        }
    }

    let mut words: Vec<(String, usize)> = freq.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(vocab_size.saturating_sub(SPECIAL_TOKENS.len()));

    for (word, _) in words {
        let next_id = vocab.len();
        vocab.entry(word).or_insert_with(|| serde_json::json!(next_id));
    }

    let tokenizer = word_level_tokenizer(vocab)?;
    tracing::info!("Word-level tokenizer built with {} entries", vocab_len(&tokenizer));
    Ok(tokenizer)
}

/// Normalized, pre-tokenized pieces of `text`, exactly as the
/// word-level model will look them up.
fn pre_tokenize(tokenizer: &Tokenizer, text: &str) -> Result<Vec<String>> {
    let mut pieces = PreTokenizedString::from(text);
    if let Some(normalizer) = tokenizer.get_normalizer() {
        pieces
            .normalize(|s| normalizer.normalize(s))
            .map_err(|e| anyhow::anyhow!("Cannot normalize corpus text: {e}"))?;
    }
    if let Some(pre_tokenizer) = tokenizer.get_pre_tokenizer() {
        pre_tokenizer
            .pre_tokenize(&mut pieces)
            .map_err(|e| anyhow::anyhow!("Cannot pre-tokenize corpus text: {e}"))?;
    }
    Ok(pieces
        .get_splits(OffsetReferential::Original, OffsetType::Byte)
        .into_iter()
        .map(|(piece, _, _)| piece.to_string())
        .filter(|piece| !piece.is_empty())
        .collect())
}

fn word_level_tokenizer(vocab: serde_json::Map<String, serde_json::Value>) -> Result<Tokenizer> {
    let added: Vec<serde_json::Value> = SPECIAL_TOKENS
        .iter()
        .enumerate()
        .map(|(id, token)| {
            serde_json::json!({
                "id": id, "content": token, "single_word": false, "lstrip": false,
                "rstrip": false, "normalized": false, "special": true
            })
        })
        .collect();

    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added,
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": true
        },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": UNK_TOKEN
        }
    });

    tokenizer_json
        .to_string()
        .parse()
        .map_err(|e| anyhow::anyhow!("Cannot build word-level tokenizer: {e}"))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_level_vocab_is_frequency_ordered() {
        let tok = build_word_level(&["good good film", "bad film good"], 100).unwrap();
        assert_eq!(tok.token_to_id(PAD_TOKEN), Some(0));
        assert_eq!(tok.token_to_id(UNK_TOKEN), Some(1));
        assert_eq!(tok.token_to_id("good"), Some(4));
        assert_eq!(tok.token_to_id("film"), Some(5));
        assert_eq!(tok.token_to_id("bad"), Some(6));
        assert_eq!(vocab_len(&tok), 7);
    }

    #[test]
    fn test_vocab_size_caps_word_count() {
        let tok = build_word_level(&["a b c d e f g"], 6).unwrap();
        assert_eq!(vocab_len(&tok), 6);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let tok = build_word_level(&["known"], 10).unwrap();
        let enc = tok.encode("known unseen", false).unwrap();
        assert_eq!(enc.get_ids(), &[4, 1]);
    }

    #[test]
    fn test_resolve_then_save_reloads() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path());

        let built = store.resolve(None, None, &["great movie"], 50).unwrap();
        assert!(!store.exists());

        store.save(&built).unwrap();
        assert!(store.exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.token_to_id("movie"), built.token_to_id("movie"));
    }

    #[test]
    fn test_resolve_prefers_base_model_tokenizer() {
        let base = tempfile::tempdir().unwrap();
        let base_store = TokenizerStore::new(base.path());
        base_store
            .save(&build_word_level(&["from the base"], 50).unwrap())
            .unwrap();

        let out = tempfile::tempdir().unwrap();
        let tok = TokenizerStore::new(out.path())
            .resolve(Some(base.path()), None, &["different corpus entirely"], 50)
            .unwrap();
        assert!(tok.token_to_id("base").is_some());
        assert!(tok.token_to_id("corpus").is_none());
    }

    #[test]
    fn test_contractions_are_in_vocabulary() {
        let tok = build_word_level(&["I didn't like it, well-made or not"], 100).unwrap();
        let unk = tok.token_to_id(UNK_TOKEN).unwrap();

        let enc = tok.encode("didn't like it", false).unwrap();
        assert!(!enc.get_ids().is_empty());
        assert!(enc.get_ids().iter().all(|&id| id != unk), "{:?}", enc.get_tokens());

        let enc = tok.encode("Well-made", false).unwrap();
        assert!(enc.get_ids().iter().all(|&id| id != unk));
    }

    #[test]
    fn test_vocabulary_entries_are_producible() {
        let tok = build_word_level(&["Wasn't GREAT... très bien!"], 100).unwrap();
        for (word, id) in tok.get_vocab(false) {
            if SPECIAL_TOKENS.contains(&word.as_str()) {
                continue;
            }
            let enc = tok.encode(word.as_str(), false).unwrap();
            assert_eq!(enc.get_ids(), &[id], "entry '{word}' does not encode to itself");
        }
    }
}
