// ============================================================
// Layer 6 — Metrics
// ============================================================
// Validation metrics for the three-class problem, the per-epoch
// CSV log, and the final plain-text report.
//
// Precision, recall and F1 are support-weighted averages over
// the classes: each class's score counts in proportion to how
// many validation records carry that label. A class that is
// never predicted has precision 0.
//
// Output files:
//   models/metrics.csv   epoch,train_loss,val_loss,accuracy,precision,recall,f1
//   metrics.txt          Accuracy: ... / Precision: ... / Recall: ... / F1: ...
//
// Reference: csv crate documentation (serde records)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use crate::domain::sentiment::Sentiment;

// ─── ClassificationReport ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy:  f64,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
}

impl ClassificationReport {
    /// Score `predictions` against `labels` (class indices, same order).
    pub fn compute(predictions: &[usize], labels: &[usize]) -> Self {
        let total = labels.len().min(predictions.len());
        if total == 0 {
            return Self::default();
        }

        // confusion[truth][predicted]
        let mut confusion = [[0usize; Sentiment::COUNT]; Sentiment::COUNT];
        for (&p, &t) in predictions.iter().zip(labels) {
            if p < Sentiment::COUNT && t < Sentiment::COUNT {
                confusion[t][p] += 1;
            }
        }

        let correct: usize = (0..Sentiment::COUNT).map(|c| confusion[c][c]).sum();
        let mut report = Self {
            accuracy: correct as f64 / total as f64,
            ..Self::default()
        };

        for c in 0..Sentiment::COUNT {
            let support: usize = confusion[c].iter().sum();
            if support == 0 {
                continue;
            }
            let tp = confusion[c][c] as f64;
            let predicted: usize = (0..Sentiment::COUNT).map(|t| confusion[t][c]).sum();

            let precision = if predicted > 0 { tp / predicted as f64 } else { 0.0 };
            let recall    = tp / support as f64;
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            let weight = support as f64 / total as f64;
            report.precision += weight * precision;
            report.recall    += weight * recall;
            report.f1        += weight * f1;
        }
        report
    }

    /// Write the four-line report file.
    pub fn write_report(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = format!(
            "Accuracy: {}\nPrecision: {}\nRecall: {}\nF1: {}\n",
            self.accuracy, self.precision, self.recall, self.f1
        );
        fs::write(path, text)
            .with_context(|| format!("Cannot write metrics report to '{}'", path.display()))?;
        tracing::info!("Metrics report written to '{}'", path.display());
        Ok(())
    }
}

// ─── EpochMetrics ─────────────────────────────────────────────────────────────
/// One row of the per-epoch log.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochMetrics {
    pub epoch:      usize,
    pub train_loss: f64,
    pub val_loss:   f64,
    pub report:     ClassificationReport,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, report: ClassificationReport) -> Self {
        Self { epoch, train_loss, val_loss, report }
    }

    /// Strictly better validation accuracy than `best`; ties keep the earlier epoch.
    pub fn is_improvement(&self, best: Option<&EpochMetrics>) -> bool {
        best.map_or(true, |b| self.report.accuracy > b.report.accuracy)
    }
}

// ─── MetricsLogger ────────────────────────────────────────────────────────────
// The csv crate cannot serialize nested structs, so rows are flat.
#[derive(Serialize)]
struct CsvRow {
    epoch:      usize,
    train_loss: f64,
    val_loss:   f64,
    accuracy:   f64,
    precision:  f64,
    recall:     f64,
    f1:         f64,
}

impl From<&EpochMetrics> for CsvRow {
    fn from(m: &EpochMetrics) -> Self {
        Self {
            epoch:      m.epoch,
            train_loss: m.train_loss,
            val_loss:   m.val_loss,
            accuracy:   m.report.accuracy,
            precision:  m.report.precision,
            recall:     m.report.recall,
            f1:         m.report.f1,
        }
    }
}

/// Writes one CSV row per epoch. A new run starts a fresh file.
pub struct MetricsLogger {
    csv_path: PathBuf,
    writer:   csv::Writer<File>,
}

impl MetricsLogger {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let csv_path = dir.join("metrics.csv");
        let writer = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        Ok(Self { csv_path, writer })
    }

    pub fn log(&mut self, m: &EpochMetrics) -> Result<()> {
        self.writer.serialize(CsvRow::from(m))?;
        self.writer.flush()?;
        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfect_predictions() {
        let r = ClassificationReport::compute(&[0, 1, 2, 2], &[0, 1, 2, 2]);
        assert!(close(r.accuracy, 1.0));
        assert!(close(r.precision, 1.0));
        assert!(close(r.recall, 1.0));
        assert!(close(r.f1, 1.0));
    }

    #[test]
    fn test_weighted_averages() {
        // truth:     0 0 1 2
        // predicted: 0 1 1 1
        // class 0: p=1,   r=0.5, f1=2/3, support 2
        // class 1: p=1/3, r=1,   f1=0.5, support 1
        // class 2: p=0,   r=0,   f1=0,   support 1
        let r = ClassificationReport::compute(&[0, 1, 1, 1], &[0, 0, 1, 2]);
        assert!(close(r.accuracy, 0.5));
        assert!(close(r.precision, 0.5 * 1.0 + 0.25 * (1.0 / 3.0)));
        assert!(close(r.recall, 0.5 * 0.5 + 0.25 * 1.0));
        assert!(close(r.f1, 0.5 * (2.0 / 3.0) + 0.25 * 0.5));
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        assert_eq!(ClassificationReport::compute(&[], &[]), ClassificationReport::default());
    }

    #[test]
    fn test_is_improvement() {
        let report = |accuracy| ClassificationReport { accuracy, ..Default::default() };
        let first  = EpochMetrics::new(1, 1.0, 1.0, report(0.5));
        let same   = EpochMetrics::new(2, 0.9, 0.9, report(0.5));
        let better = EpochMetrics::new(3, 0.8, 0.8, report(0.6));

        assert!(first.is_improvement(None));
        assert!(!same.is_improvement(Some(&first)));
        assert!(better.is_improvement(Some(&first)));
    }

    #[test]
    fn test_report_has_four_labeled_lines() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.txt");
        let r = ClassificationReport { accuracy: 0.75, precision: 0.5, recall: 0.25, f1: 0.125 };
        r.write_report(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Accuracy: 0.75", "Precision: 0.5", "Recall: 0.25", "F1: 0.125"]);
    }

    #[test]
    fn test_logger_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = MetricsLogger::create(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 1.5, 1.25, ClassificationReport::default())).unwrap();
        logger.log(&EpochMetrics::new(2, 1.0, 1.0, ClassificationReport::default())).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "epoch,train_loss,val_loss,accuracy,precision,recall,f1");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,1.5,1.25,"));
    }
}
