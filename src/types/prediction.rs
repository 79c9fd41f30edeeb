//! Prediction output types and the model identifier enumeration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for one of the five scorable classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    RandomForest,
    GradientBoosting,
    LogisticRegression,
    Svm,
    PcaLr,
}

impl ModelId {
    /// All known model identifiers, in canonical order.
    pub const ALL: [ModelId; 5] = [
        ModelId::RandomForest,
        ModelId::GradientBoosting,
        ModelId::LogisticRegression,
        ModelId::Svm,
        ModelId::PcaLr,
    ];

    /// Wire-format name of the identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::RandomForest => "random_forest",
            ModelId::GradientBoosting => "gradient_boosting",
            ModelId::LogisticRegression => "logistic_regression",
            ModelId::Svm => "svm",
            ModelId::PcaLr => "pca_lr",
        }
    }

    /// Parse a wire-format name; `None` for anything outside the enumeration.
    pub fn parse(name: &str) -> Option<ModelId> {
        ModelId::ALL.into_iter().find(|id| id.as_str() == name)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary conversion verdict derived from the predicted probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionLabel {
    #[serde(rename = "Will Convert")]
    WillConvert,
    #[serde(rename = "Will Not Convert")]
    WillNotConvert,
}

impl PredictionLabel {
    /// Convert iff probability is strictly above 0.5.
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.5 {
            PredictionLabel::WillConvert
        } else {
            PredictionLabel::WillNotConvert
        }
    }
}

/// Qualitative confidence tier from distance to the decision boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// |p - 0.5| > 0.3 is High, > 0.15 is Medium, anything closer is Low.
    pub fn from_probability(probability: f64) -> Self {
        let distance = (probability - 0.5).abs();
        if distance > 0.3 {
            Confidence::High
        } else if distance > 0.15 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// Result of scoring one feature record against one model.
///
/// Produced fresh per request, never cached. `model_loaded` reports whether
/// a registry entry existed for the requested model, independently of
/// whether that entry was usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Positive-class probability in [0, 1]
    pub probability: f64,

    /// Thresholded verdict
    pub prediction: PredictionLabel,

    /// Confidence tier
    pub confidence: Confidence,

    /// The model identifier the caller requested
    pub model_used: ModelId,

    /// Whether a trained model artifact was present for that identifier
    pub model_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_round_trip() {
        for id in ModelId::ALL {
            assert_eq!(ModelId::parse(id.as_str()), Some(id));
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
        assert_eq!(ModelId::parse("neural_net"), None);
    }

    #[test]
    fn test_label_threshold() {
        assert_eq!(
            PredictionLabel::from_probability(0.5),
            PredictionLabel::WillNotConvert
        );
        assert_eq!(
            PredictionLabel::from_probability(0.5001),
            PredictionLabel::WillConvert
        );
        assert_eq!(
            PredictionLabel::from_probability(0.306),
            PredictionLabel::WillNotConvert
        );
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(Confidence::from_probability(0.5), Confidence::Low);
        assert_eq!(Confidence::from_probability(0.65), Confidence::Low);
        assert_eq!(Confidence::from_probability(0.66), Confidence::Medium);
        assert_eq!(Confidence::from_probability(0.8), Confidence::Medium);
        assert_eq!(Confidence::from_probability(0.81), Confidence::High);
        assert_eq!(Confidence::from_probability(0.05), Confidence::High);
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(
            serde_json::to_string(&PredictionLabel::WillConvert).unwrap(),
            "\"Will Convert\""
        );
        assert_eq!(
            serde_json::to_string(&Confidence::Medium).unwrap(),
            "\"Medium\""
        );
    }

    #[test]
    fn test_prediction_result_serialization() {
        let result = PredictionResult {
            probability: 0.306,
            prediction: PredictionLabel::WillNotConvert,
            confidence: Confidence::Medium,
            model_used: ModelId::Svm,
            model_loaded: false,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["probability"], 0.306);
        assert_eq!(json["prediction"], "Will Not Convert");
        assert_eq!(json["confidence"], "Medium");
        assert_eq!(json["model_used"], "svm");
        assert_eq!(json["model_loaded"], false);
    }
}
