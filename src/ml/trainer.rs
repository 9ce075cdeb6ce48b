// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
// Per epoch:
//   1. One shuffled pass over the training set, Adam step per batch
//   2. model.valid() → forward over the validation set with the
//      inner backend (no autodiff, dropout off)
//   3. Loss, accuracy and weighted precision / recall / F1
//   4. Row appended to metrics.csv, checkpoint saved
//   5. If validation accuracy improved, the weights become the
//      artifact's served model and the manifest records the epoch
//
// Burn notes:
//   - model.valid() returns the model on B::InnerBackend,
//     so the validation batcher uses that backend as well
//   - argmax(1) returns [batch, 1]; predicted_classes flattens it
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Context, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use std::sync::Arc;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{SentimentBatch, SentimentBatcher},
    dataset::SentimentDataset,
};
use crate::infra::{
    checkpoint::{ArtifactManifest, ArtifactStore},
    metrics::{ClassificationReport, EpochMetrics, MetricsLogger},
};
use crate::ml::model::{predicted_classes, SentimentClassifier};

/// Metrics of every epoch plus the one whose weights were kept.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best:    EpochMetrics,
    pub history: Vec<EpochMetrics>,
}

pub fn run_training<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    mut model:     SentimentClassifier<B>,
    mut manifest:  ArtifactManifest,
    train_dataset: SentimentDataset,
    val_dataset:   SentimentDataset,
    store:         &ArtifactStore,
    device:        B::Device,
) -> Result<TrainingOutcome> {
    if cfg.epochs == 0 {
        bail!("Number of epochs must be at least 1");
    }
    if cfg.batch_size == 0 {
        bail!("Batch size must be at least 1");
    }

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new()
        .with_epsilon(1e-8)
        .init::<B, SentimentClassifier<B>>();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(SentimentBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    let val_loader = DataLoaderBuilder::new(SentimentBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut logger = MetricsLogger::create(store.dir())?;
    let mut best: Option<EpochMetrics> = None;
    let mut history = Vec::with_capacity(cfg.epochs);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = mean(train_loss_sum, train_batches);
        let (val_loss, report) = evaluate(&model.valid(), &val_loader);
        let metrics = EpochMetrics::new(epoch, train_loss, val_loss, report);

        tracing::info!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | acc={:.1}% | f1={:.3}",
            epoch, cfg.epochs, train_loss, val_loss,
            report.accuracy * 100.0, report.f1,
        );

        logger.log(&metrics)?;
        store.save_checkpoint(&model, epoch)?;

        if metrics.is_improvement(best.as_ref()) {
            store.save_model(&model)
                .with_context(|| format!("Cannot promote epoch {epoch} to best model"))?;
            manifest.best_epoch = Some(epoch);
            store.save_manifest(&manifest)?;
            tracing::info!("New best model at epoch {} (accuracy {:.4})", epoch, report.accuracy);
            best = Some(metrics.clone());
        }
        history.push(metrics);
    }

    let best = best.context("No epoch produced a model")?;
    tracing::info!("Training complete! Best epoch: {}", best.epoch);
    Ok(TrainingOutcome { best, history })
}

/// Average loss and classification report over a validation loader.
pub fn evaluate<B: Backend>(
    model:  &SentimentClassifier<B>,
    loader: &Arc<dyn DataLoader<SentimentBatch<B>>>,
) -> (f64, ClassificationReport) {
    let mut loss_sum    = 0.0f64;
    let mut batches     = 0usize;
    let mut predictions = Vec::new();
    let mut labels      = Vec::new();

    for batch in loader.iter() {
        labels.extend(
            batch.labels.clone().into_data().iter::<i64>().map(|l| l as usize)
        );

        let (loss, logits) = model.forward_loss(batch);
        loss_sum += loss.into_scalar().elem::<f64>();
        batches  += 1;

        predictions.extend(predicted_classes(logits));
    }

    (mean(loss_sum, batches), ClassificationReport::compute(&predictions, &labels))
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 { sum / count as f64 } else { f64::NAN }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::SentimentSample;
    use crate::ml::model::SentimentClassifierConfig;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn samples(n: usize) -> Vec<SentimentSample> {
        (0..n)
            .map(|i| SentimentSample {
                input_ids:      vec![(i % 5) as u32 + 4, 2, 0, 0],
                attention_mask: vec![1, 1, 0, 0],
                label:          i % 3,
            })
            .collect()
    }

    #[test]
    fn test_training_keeps_best_epoch_and_writes_artifacts() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let cfg   = TrainConfig {
            epochs:     2,
            batch_size: 4,
            model_dir:  dir.path().to_string_lossy().into_owned(),
            ..TrainConfig::default()
        };

        let model_cfg = SentimentClassifierConfig::new(10, 4)
            .with_d_model(8)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(16);
        let device = Default::default();
        let model: SentimentClassifier<TestBackend> = model_cfg.init(&device);
        let manifest = ArtifactManifest {
            model:       model_cfg,
            max_seq_len: 4,
            clean_text:  false,
            best_epoch:  None,
        };

        let outcome = run_training(
            &cfg,
            model,
            manifest,
            SentimentDataset::new(samples(9)),
            SentimentDataset::new(samples(3)),
            &store,
            device,
        )
        .unwrap();

        assert_eq!(outcome.history.len(), 2);
        assert!((0.0..=1.0).contains(&outcome.best.report.accuracy));
        assert!(outcome.history.iter().all(|m| m.report.accuracy <= outcome.best.report.accuracy));

        let saved = store.load_manifest().unwrap();
        assert_eq!(saved.best_epoch, Some(outcome.best.epoch));
        assert!(dir.path().join("model.mpk").exists());
        assert!(dir.path().join("checkpoints").join("epoch_2.mpk").exists());
        assert!(dir.path().join("metrics.csv").exists());
    }

    #[test]
    fn test_zero_epochs_is_rejected() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let cfg   = TrainConfig { epochs: 0, ..TrainConfig::default() };
        let model_cfg = SentimentClassifierConfig::new(10, 4).with_d_model(8).with_num_heads(2)
            .with_num_layers(1).with_d_ff(16);
        let device = Default::default();
        let model: SentimentClassifier<TestBackend> = model_cfg.init(&device);
        let manifest = ArtifactManifest { model: model_cfg, max_seq_len: 4, clean_text: false, best_epoch: None };

        let err = run_training(
            &cfg, model, manifest,
            SentimentDataset::new(samples(3)), SentimentDataset::new(samples(1)),
            &store, device,
        )
        .unwrap_err();
        assert!(err.to_string().contains("epochs"));
    }
}
