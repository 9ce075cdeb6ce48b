// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Skip if a trained model exists  (Layer 6 - infra, opt-in)
//   Step 2: Load the review CSV             (Layer 4 - data)
//   Step 3: Split train/validation          (Layer 4 - data)
//   Step 4: Resolve the tokenizer           (Layer 6 - infra)
//   Step 5: Build or load the model         (Layer 5 - ml)
//   Step 6: Encode the datasets             (Layer 4 - data)
//   Step 7: Replace the previous artifact   (Layer 6 - infra)
//   Step 8: Run the training loop           (Layer 5 - ml)
//   Step 9: Write the metrics report        (Layer 6 - infra)
//
// Nothing in the model directory is touched before Step 7. From
// Step 7 on, the old weights are gone and the directory only
// counts as complete again once an epoch has been promoted.
//
// Every failure is logged here before it propagates.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Context, Result};
use burn::{backend::wgpu::WgpuDevice, tensor::backend::AutodiffBackend};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

use crate::data::{
    dataset::SentimentDataset,
    encoder::{TextEncoder, DEFAULT_MAX_SEQ_LEN},
    loader::CsvReviewLoader,
    preprocessor::Preprocessor,
    splitter::{Splitter, DEFAULT_MIN_RECORDS, DEFAULT_SEED, DEFAULT_VALIDATION_FRACTION},
};
use crate::domain::{review::LabeledRecord, traits::RecordSource};
use crate::infra::{
    checkpoint::{ArtifactManifest, ArtifactStore},
    metrics::ClassificationReport,
    tokenizer_store::vocab_len,
};
use crate::ml::{
    model::{SentimentClassifier, SentimentClassifierConfig},
    trainer::run_training,
    TrainBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for one training run. Serialisable so a run can be
// described in JSON as well as on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:           String,
    pub model_dir:           String,
    pub metrics_path:        String,
    pub max_seq_len:         usize,
    pub batch_size:          usize,
    pub epochs:              usize,
    pub lr:                  f64,
    pub validation_fraction: f64,
    pub seed:                u64,
    pub min_records:         usize,
    pub d_model:             usize,
    pub num_heads:           usize,
    pub num_layers:          usize,
    pub d_ff:                usize,
    pub dropout:             f64,
    /// Upper bound for a vocabulary built from the corpus.
    pub vocab_size:          usize,
    pub clean_text:          bool,
    /// Previously trained model directory to fine-tune from.
    pub base_model:          Option<String>,
    /// Pretrained tokenizer.json to use instead of building one.
    pub tokenizer:           Option<String>,
    pub skip_if_trained:     bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:           "data/dataset.csv".to_string(),
            model_dir:           "models".to_string(),
            metrics_path:        "metrics.txt".to_string(),
            max_seq_len:         DEFAULT_MAX_SEQ_LEN,
            batch_size:          8,
            epochs:              2,
            lr:                  5e-5,
            validation_fraction: DEFAULT_VALIDATION_FRACTION,
            seed:                DEFAULT_SEED,
            min_records:         DEFAULT_MIN_RECORDS,
            d_model:             256,
            num_heads:           8,
            num_layers:          6,
            d_ff:                1024,
            dropout:             0.1,
            vocab_size:          30522,
            clean_text:          false,
            base_model:          None,
            tokenizer:           None,
            skip_if_trained:     false,
        }
    }
}

/// What a training run ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainOutcome {
    /// `skip_if_trained` was set and the model directory was complete.
    Skipped,
    /// Validation metrics of the best epoch.
    Trained(ClassificationReport),
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train on the default GPU backend.
    pub fn execute(&self) -> Result<TrainOutcome> {
        self.execute_on::<TrainBackend>(WgpuDevice::default())
    }

    /// Train on any autodiff backend.
    pub fn execute_on<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainOutcome> {
        let result = self.run::<B>(device);
        if let Err(e) = &result {
            tracing::error!("Training failed: {e:#}");
        }
        result
    }

    fn run<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainOutcome> {
        let cfg   = &self.config;
        let store = ArtifactStore::new(&cfg.model_dir);

        // ── Step 1: Reuse an existing model if asked to ──────────────────────
        if cfg.skip_if_trained && store.is_complete() {
            tracing::info!("Model found in '{}', skipping training", cfg.model_dir);
            return Ok(TrainOutcome::Skipped);
        }
        if cfg.epochs == 0 || cfg.batch_size == 0 {
            bail!("Epochs and batch size must both be at least 1");
        }

        // ── Step 2: Load the reviews ─────────────────────────────────────────
        tracing::info!("Loading reviews from '{}'", cfg.data_path);
        let records = CsvReviewLoader::new(&cfg.data_path)
            .load()
            .with_context(|| format!("Cannot load dataset '{}'", cfg.data_path))?;
        log_label_counts(&records);

        // ── Step 3: Train / validation split ─────────────────────────────────
        let (train_records, val_records) = Splitter::new(cfg.validation_fraction, cfg.seed)
            .with_min_records(cfg.min_records)
            .split(records)
            .context("Cannot split dataset")?;
        tracing::info!(
            "Split: {} train, {} validation",
            train_records.len(),
            val_records.len()
        );

        // ── Step 4: Tokenizer ────────────────────────────────────────────────
        // A corpus vocabulary is built from training text only, cleaned the
        // same way the encoder will clean it.
        let preprocessor = Preprocessor::new();
        let corpus: Vec<String> = train_records
            .iter()
            .map(|r| if cfg.clean_text { preprocessor.clean(&r.content) } else { r.content.clone() })
            .collect();
        let corpus: Vec<&str> = corpus.iter().map(String::as_str).collect();

        let base_dir  = cfg.base_model.as_deref().map(Path::new);
        let tokenizer = store
            .tokenizer_store()
            .resolve(base_dir, cfg.tokenizer.as_deref().map(Path::new), &corpus, cfg.vocab_size)?;

        // ── Step 5: Model ────────────────────────────────────────────────────
        let (manifest, model) = match base_dir {
            Some(dir) => self.load_base_model::<B>(dir, &device)?,
            None      => self.fresh_model::<B>(vocab_len(&tokenizer), &device),
        };

        let encoder = TextEncoder::new(tokenizer, manifest.max_seq_len)
            .with_cleaning(manifest.clean_text);
        if encoder.vocab_len() > manifest.model.vocab_size {
            bail!(
                "Tokenizer has {} ids but the model embeds only {}",
                encoder.vocab_len(),
                manifest.model.vocab_size
            );
        }

        // ── Step 6: Encode ───────────────────────────────────────────────────
        let train_dataset = SentimentDataset::encode(&train_records, &encoder)
            .context("Cannot encode training set")?;
        let val_dataset = SentimentDataset::encode(&val_records, &encoder)
            .context("Cannot encode validation set")?;
        tracing::info!(
            "Encoded {} training / {} validation samples (max_seq_len={}, cleaning={})",
            train_dataset.sample_count(),
            val_dataset.sample_count(),
            encoder.max_len(),
            encoder.cleans_text(),
        );

        // ── Step 7: Replace the previous artifact ────────────────────────────
        store.discard_model()?;
        store.tokenizer_store().save(encoder.tokenizer())?;
        store.save_manifest(&manifest)?;

        // ── Step 8: Training loop (Layer 5) ──────────────────────────────────
        let outcome = run_training(cfg, model, manifest, train_dataset, val_dataset, &store, device)?;

        // ── Step 9: Metrics report ───────────────────────────────────────────
        let report = outcome.best.report;
        report.write_report(Path::new(&cfg.metrics_path))?;

        tracing::info!(
            "Best epoch {}: accuracy={:.4} precision={:.4} recall={:.4} f1={:.4}",
            outcome.best.epoch, report.accuracy, report.precision, report.recall, report.f1,
        );
        Ok(TrainOutcome::Trained(report))
    }

    fn fresh_model<B: AutodiffBackend>(
        &self,
        vocab_size: usize,
        device:     &B::Device,
    ) -> (ArtifactManifest, SentimentClassifier<B>) {
        let cfg = &self.config;
        let model_cfg = SentimentClassifierConfig::new(vocab_size, cfg.max_seq_len)
            .with_d_model(cfg.d_model)
            .with_num_heads(cfg.num_heads)
            .with_num_layers(cfg.num_layers)
            .with_d_ff(cfg.d_ff)
            .with_dropout(cfg.dropout);
        tracing::info!(
            "Initialising encoder: vocab={}, d_model={}, layers={}",
            vocab_size, cfg.d_model, cfg.num_layers
        );

        let model = model_cfg.init(device);
        let manifest = ArtifactManifest {
            model:       model_cfg,
            max_seq_len: cfg.max_seq_len,
            clean_text:  cfg.clean_text,
            best_epoch:  None,
        };
        (manifest, model)
    }

    /// Architecture, sequence length and weights come from the base model;
    /// only the cleaning setting follows this run's config.
    fn load_base_model<B: AutodiffBackend>(
        &self,
        dir:    &Path,
        device: &B::Device,
    ) -> Result<(ArtifactManifest, SentimentClassifier<B>)> {
        tracing::info!("Fine-tuning from base model '{}'", dir.display());
        let (base, model) = ArtifactStore::new(dir)
            .load_classifier::<B>(device)
            .with_context(|| format!("Cannot load base model '{}'", dir.display()))?;

        if base.max_seq_len != self.config.max_seq_len {
            tracing::warn!(
                "Base model uses max_seq_len={}, ignoring --max-seq-len {}",
                base.max_seq_len,
                self.config.max_seq_len
            );
        }

        let manifest = ArtifactManifest {
            model:       base.model,
            max_seq_len: base.max_seq_len,
            clean_text:  self.config.clean_text,
            best_epoch:  None,
        };
        Ok((manifest, model))
    }
}

fn log_label_counts(records: &[LabeledRecord]) {
    let mut counts: BTreeMap<_, usize> = BTreeMap::new();
    for r in records {
        *counts.entry(r.label).or_default() += 1;
    }
    for (label, count) in counts {
        tracing::info!("  {label}: {count} reviews");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{error::PipelineError, sentiment::Sentiment};
    use crate::ml::inferencer::Inferencer;
    use burn::backend::{Autodiff, NdArray};
    use std::fs;

    type TestBackend = Autodiff<NdArray>;

    const CSV: &str = "\
content,score
I loved this film,5
Absolutely wonderful acting,5
Great story and great cast,4
It was fine I guess,3
Nothing special either way,3
An average evening,3
Terrible plot,1
I hated every minute,1
Boring and far too long,2
Would watch again,4
";

    fn tiny_config(dir: &Path) -> TrainConfig {
        fs::write(dir.join("reviews.csv"), CSV).unwrap();
        TrainConfig {
            data_path:    dir.join("reviews.csv").to_string_lossy().into_owned(),
            model_dir:    dir.join("models").to_string_lossy().into_owned(),
            metrics_path: dir.join("metrics.txt").to_string_lossy().into_owned(),
            max_seq_len:  8,
            batch_size:   4,
            epochs:       1,
            d_model:      8,
            num_heads:    2,
            num_layers:   1,
            d_ff:         16,
            vocab_size:   100,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_end_to_end_artifact_is_servable() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());

        let outcome = TrainUseCase::new(cfg.clone())
            .execute_on::<TestBackend>(Default::default())
            .unwrap();
        assert!(matches!(outcome, TrainOutcome::Trained(_)));

        let report = fs::read_to_string(&cfg.metrics_path).unwrap();
        let keys: Vec<&str> = report.lines().filter_map(|l| l.split(':').next()).collect();
        assert_eq!(keys, vec!["Accuracy", "Precision", "Recall", "F1"]);

        let inferencer = Inferencer::<NdArray>::from_artifacts(
            &ArtifactStore::new(&cfg.model_dir),
            Default::default(),
        )
        .unwrap();
        let s = inferencer.predict("great film").unwrap();
        assert!(Sentiment::ALL.contains(&s));
    }

    #[test]
    fn test_skip_if_trained() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        TrainUseCase::new(cfg.clone())
            .execute_on::<TestBackend>(Default::default())
            .unwrap();

        let again = TrainUseCase::new(TrainConfig { skip_if_trained: true, ..cfg })
            .execute_on::<TestBackend>(Default::default())
            .unwrap();
        assert_eq!(again, TrainOutcome::Skipped);
    }

    #[test]
    fn test_fine_tune_from_base_model() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        TrainUseCase::new(cfg.clone())
            .execute_on::<TestBackend>(Default::default())
            .unwrap();

        let tuned_dir = dir.path().join("tuned");
        let tuned = TrainConfig {
            base_model: Some(cfg.model_dir.clone()),
            model_dir:  tuned_dir.to_string_lossy().into_owned(),
            // ignored in favour of the base model's length
            max_seq_len: 16,
            ..cfg
        };
        TrainUseCase::new(tuned).execute_on::<TestBackend>(Default::default()).unwrap();

        let manifest = ArtifactStore::new(&tuned_dir).load_manifest().unwrap();
        assert_eq!(manifest.max_seq_len, 8);
        assert!(tuned_dir.join("tokenizer.json").exists());
    }

    #[test]
    fn test_too_few_records_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = tiny_config(dir.path());
        fs::write(&cfg.data_path, "content,score\nok,3\nbad,1\n").unwrap();
        cfg.min_records = 5;

        let err = TrainUseCase::new(cfg)
            .execute_on::<TestBackend>(Default::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InsufficientData { found: 2, required: 5 })
        ));
    }

    #[test]
    fn test_missing_dataset_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            data_path: dir.path().join("nope.csv").to_string_lossy().into_owned(),
            model_dir: dir.path().join("models").to_string_lossy().into_owned(),
            ..TrainConfig::default()
        };
        let err = TrainUseCase::new(cfg)
            .execute_on::<TestBackend>(Default::default())
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::NotFound(_))));
    }

    #[test]
    fn test_rejected_retrain_keeps_previous_model() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        TrainUseCase::new(cfg.clone())
            .execute_on::<TestBackend>(Default::default())
            .unwrap();

        let bad = TrainConfig { d_model: 16, epochs: 0, ..cfg.clone() };
        assert!(TrainUseCase::new(bad).execute_on::<TestBackend>(Default::default()).is_err());

        let store = ArtifactStore::new(&cfg.model_dir);
        assert!(store.is_complete());
        assert_eq!(store.load_manifest().unwrap().model.d_model, 8);
        let inferencer = Inferencer::<NdArray>::from_artifacts(&store, Default::default()).unwrap();
        assert!(Sentiment::ALL.contains(&inferencer.predict("loved it").unwrap()));
    }

    #[test]
    fn test_retrain_failing_mid_run_leaves_incomplete_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        TrainUseCase::new(cfg.clone())
            .execute_on::<TestBackend>(Default::default())
            .unwrap();

        // The metrics log cannot be created once training starts
        let metrics_csv = Path::new(&cfg.model_dir).join("metrics.csv");
        fs::remove_file(&metrics_csv).unwrap();
        fs::create_dir(&metrics_csv).unwrap();

        let retrain = TrainConfig { d_model: 16, ..cfg.clone() };
        assert!(TrainUseCase::new(retrain).execute_on::<TestBackend>(Default::default()).is_err());

        let store = ArtifactStore::new(&cfg.model_dir);
        assert!(!store.is_complete());
        assert!(matches!(
            Inferencer::<NdArray>::from_artifacts(&store, Default::default()),
            Err(PipelineError::NotFound(_))
        ));

        let skip = TrainConfig { skip_if_trained: true, ..cfg };
        let again = TrainUseCase::new(skip).execute_on::<TestBackend>(Default::default());
        assert!(!matches!(again, Ok(TrainOutcome::Skipped)));
    }
}
