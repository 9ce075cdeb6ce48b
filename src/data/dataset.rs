use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::encoder::TextEncoder;
use crate::domain::{error::PipelineError, review::LabeledRecord};

/// One tokenised, padded training sample with its class index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSample {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub label:          usize,
}

pub struct SentimentDataset {
    samples: Vec<SentimentSample>,
}

impl SentimentDataset {
    pub fn new(samples: Vec<SentimentSample>) -> Self { Self { samples } }

    /// Encode every record with `encoder`.
    pub fn encode(records: &[LabeledRecord], encoder: &TextEncoder) -> Result<Self, PipelineError> {
        let texts: Vec<&str> = records.iter().map(|r| r.content.as_str()).collect();
        let samples = encoder
            .encode_batch(&texts)?
            .into_iter()
            .zip(records)
            .map(|(enc, r)| SentimentSample {
                input_ids:      enc.input_ids,
                attention_mask: enc.attention_mask,
                label:          r.label.index(),
            })
            .collect();
        Ok(Self::new(samples))
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<SentimentSample> for SentimentDataset {
    fn get(&self, index: usize) -> Option<SentimentSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
