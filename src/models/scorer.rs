//! Conversion scoring: trained-model path with an analytic fallback.

use crate::feature_extractor::FeatureExtractor;
use crate::models::registry::{ModelRegistry, RegistryEntry};
use crate::types::prediction::{Confidence, ModelId, PredictionLabel, PredictionResult};
use crate::types::record::FeatureRecord;
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

/// Scores one feature record against one selectable model.
///
/// Total: a missing registry entry or any failure inside the model path
/// degrades to the rule-based fallback formula instead of surfacing an
/// error to the caller.
pub struct ConversionScorer {
    registry: Arc<ModelRegistry>,
    extractor: FeatureExtractor,
}

impl ConversionScorer {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            extractor: FeatureExtractor::new(),
        }
    }

    /// Score a record with the requested model.
    ///
    /// `model_loaded` in the result reports registry presence for the
    /// identifier, independent of whether the entry was usable.
    pub fn score(&self, record: &FeatureRecord, model: ModelId) -> PredictionResult {
        let features = self.extractor.extract(record);
        let entry = self.registry.get(model);
        let model_loaded = entry.is_some();

        let probability = match entry {
            Some(entry) => match model_probability(entry, model, &features) {
                Ok(p) => p,
                Err(e) => {
                    warn!(model = %model, error = %e, "model scoring failed, using fallback formula");
                    fallback_probability(record, model)
                }
            },
            None => fallback_probability(record, model),
        };

        PredictionResult {
            probability,
            prediction: PredictionLabel::from_probability(probability),
            confidence: Confidence::from_probability(probability),
            model_used: model,
            model_loaded,
        }
    }
}

/// Run the trained pipeline: scale, reduce (PCA model only), classify.
/// The classifier's probability is passed through unclamped.
fn model_probability(entry: &RegistryEntry, model: ModelId, features: &[f64]) -> Result<f64> {
    let mut features = features.to_vec();

    if let Some(scaler) = &entry.scaler {
        features = scaler.transform(&features)?;
    }

    if model == ModelId::PcaLr {
        if let Some(reducer) = &entry.reducer {
            features = reducer.transform(&features)?;
        }
    }

    let input: Vec<f32> = features.iter().map(|&v| v as f32).collect();
    entry.classifier.positive_probability(&input)
}

/// Rule-based conversion probability, used when no trained model can
/// score the record. Clamped to [0.05, 0.95].
pub fn fallback_probability(record: &FeatureRecord, model: ModelId) -> f64 {
    let ctr = record.click_through_rate();

    // ctr is weighted at 0.3 plus a second 0.1 term.
    let score = ctr * 0.3
        + record.engagement_duration / 100.0 * 0.2
        + record.sentiment_score * 0.2
        + record.previous_interaction_score * 0.2
        + ctr * 0.1;

    let multiplier = match model {
        ModelId::Svm => 0.9,
        ModelId::LogisticRegression => 1.1,
        _ => 1.0,
    };

    (score * multiplier).clamp(0.05, 0.95)
}
