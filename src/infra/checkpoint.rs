// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Owns the layout of the model directory. Weights are written
// with Burn's CompactRecorder (MessagePack, half precision).
//
//   models/
//     model.mpk              ← weights of the best epoch
//     manifest.json          ← architecture + encoding settings
//     tokenizer.json         ← vocabulary the weights expect
//     metrics.csv            ← one row per epoch
//     checkpoints/
//       epoch_1.mpk          ← weights after epoch 1
//       epoch_2.mpk
//       ...
//
// The manifest is what lets inference rebuild the exact
// architecture before loading weights into it; loading fails
// if the two disagree.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::infra::tokenizer_store::TokenizerStore;
use crate::ml::model::{SentimentClassifier, SentimentClassifierConfig};

const MODEL_FILE:      &str = "model";
const MODEL_EXTENSION: &str = "mpk";
const MANIFEST_FILE:   &str = "manifest.json";
const CHECKPOINT_DIR:  &str = "checkpoints";

/// Everything needed to rebuild a trained model besides its weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub model:       SentimentClassifierConfig,
    pub max_seq_len: usize,
    pub clean_text:  bool,
    /// Epoch whose weights are in model.mpk; None until one is saved.
    pub best_epoch:  Option<usize>,
}

/// Manages one model directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tokenizer_store(&self) -> TokenizerStore {
        TokenizerStore::new(&self.dir)
    }

    fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    fn checkpoint_path(&self, epoch: usize) -> PathBuf {
        self.dir.join(CHECKPOINT_DIR).join(format!("epoch_{epoch}"))
    }

    /// True when weights and tokenizer are present and the manifest
    /// records which epoch the weights came from.
    pub fn is_complete(&self) -> bool {
        self.weights_file().exists()
            && self.tokenizer_store().exists()
            && self
                .load_manifest()
                .map_or(false, |m| m.best_epoch.is_some())
    }

    /// Delete the served weights so a new run starts from an
    /// incomplete directory. Checkpoints are left in place.
    pub fn discard_model(&self) -> Result<()> {
        let path = self.weights_file();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Cannot remove old weights '{}'", path.display()))?;
            tracing::info!("Removed previous weights '{}'", path.display());
        }
        Ok(())
    }

    fn weights_file(&self) -> PathBuf {
        self.model_path().with_extension(MODEL_EXTENSION)
    }

    pub fn save_manifest(&self, manifest: &ArtifactManifest) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write manifest to '{}'", path.display()))?;
        tracing::debug!("Saved manifest to '{}'", path.display());
        Ok(())
    }

    pub fn load_manifest(&self) -> Result<ArtifactManifest> {
        let path = self.dir.join(MANIFEST_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read manifest from '{}'. Has the model been trained?",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed manifest '{}'", path.display()))
    }

    /// Save the weights of a finished epoch under checkpoints/.
    pub fn save_checkpoint<B: Backend>(&self, model: &SentimentClassifier<B>, epoch: usize) -> Result<()> {
        let path = self.checkpoint_path(epoch);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        record(model, path)?;
        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Save `model` as the artifact's served weights.
    pub fn save_model<B: Backend>(&self, model: &SentimentClassifier<B>) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        record(model, self.model_path())
    }

    /// Restore the served weights into `model`, which must have the
    /// architecture described by the manifest.
    pub fn load_model<B: Backend>(
        &self,
        model:  SentimentClassifier<B>,
        device: &B::Device,
    ) -> Result<SentimentClassifier<B>> {
        let path = self.model_path();
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load weights '{}'. Have you trained the model first?", path.display())
            })?;
        Ok(model.load_record(record))
    }

    /// Rebuild the architecture from the manifest and load the weights.
    pub fn load_classifier<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<(ArtifactManifest, SentimentClassifier<B>)> {
        let manifest = self.load_manifest()?;
        let model    = self.load_model(manifest.model.init(device), device)?;
        tracing::info!(
            "Model loaded from '{}' (best epoch {:?})",
            self.dir.display(),
            manifest.best_epoch
        );
        Ok((manifest, model))
    }
}

fn record<B: Backend>(model: &SentimentClassifier<B>, path: PathBuf) -> Result<()> {
    CompactRecorder::new()
        .record(model.clone().into_record(), path.clone())
        .with_context(|| format!("Failed to save weights to '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn manifest() -> ArtifactManifest {
        ArtifactManifest {
            model: SentimentClassifierConfig::new(12, 6)
                .with_d_model(8)
                .with_num_heads(2)
                .with_num_layers(1)
                .with_d_ff(16),
            max_seq_len: 6,
            clean_text:  true,
            best_epoch:  Some(2),
        }
    }

    #[test]
    fn test_manifest_round_trip() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save_manifest(&manifest()).unwrap();

        let loaded = store.load_manifest().unwrap();
        assert_eq!(loaded.max_seq_len, 6);
        assert!(loaded.clean_text);
        assert_eq!(loaded.best_epoch, Some(2));
        assert_eq!(loaded.model.d_model, 8);
    }

    #[test]
    fn test_missing_manifest_mentions_training() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactStore::new(dir.path()).load_manifest().unwrap_err();
        assert!(err.to_string().contains("trained"));
    }

    #[test]
    fn test_weights_survive_save_and_load() {
        let dir    = tempfile::tempdir().unwrap();
        let store  = ArtifactStore::new(dir.path());
        let device = Default::default();

        let m = manifest();
        let original: SentimentClassifier<NdArray> = m.model.init(&device);
        store.save_manifest(&m).unwrap();
        store.save_model(&original).unwrap();
        store.save_checkpoint(&original, 1).unwrap();
        assert!(dir.path().join("checkpoints").join("epoch_1.mpk").exists());

        let (_, restored) = store.load_classifier::<NdArray>(&device).unwrap();

        let ids  = Tensor::<NdArray, 2, Int>::ones([1, 6], &device);
        let mask = Tensor::<NdArray, 2, Int>::ones([1, 6], &device);
        let a: Vec<f32> = original.forward(ids.clone(), mask.clone()).into_data().iter::<f32>().collect();
        let b: Vec<f32> = restored.forward(ids, mask).into_data().iter::<f32>().collect();
        for (x, y) in a.iter().zip(&b) {
            // CompactRecorder stores half precision
            assert!((x - y).abs() < 5e-2, "{x} vs {y}");
        }
    }

    #[test]
    fn test_complete_requires_promoted_epoch() {
        let dir    = tempfile::tempdir().unwrap();
        let store  = ArtifactStore::new(dir.path());
        let device = Default::default();

        let mut m = manifest();
        let model: SentimentClassifier<NdArray> = m.model.init(&device);
        let tokenizer = crate::infra::tokenizer_store::build_word_level(&["fine"], 12).unwrap();
        store.tokenizer_store().save(&tokenizer).unwrap();
        store.save_model(&model).unwrap();

        m.best_epoch = None;
        store.save_manifest(&m).unwrap();
        assert!(!store.is_complete());

        m.best_epoch = Some(1);
        store.save_manifest(&m).unwrap();
        assert!(store.is_complete());

        store.discard_model().unwrap();
        assert!(!store.is_complete());
        assert!(!dir.path().join("model.mpk").exists());

        // nothing left to remove
        store.discard_model().unwrap();
    }
}
