//! Feature extraction for conversion model inference.
//!
//! Transforms a feature record into the ordered vector the trained
//! models expect. The order must stay in sync with the training
//! pipeline's column order.

use crate::types::record::FeatureRecord;

/// Extractor that turns a [`FeatureRecord`] into a model input vector.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract the ten-element feature vector, in training order.
    pub fn extract(&self, record: &FeatureRecord) -> Vec<f64> {
        vec![
            record.age,
            record.gender,
            record.location,
            record.device_type,
            record.impressions,
            record.clicks,
            record.engagement_duration,
            record.sentiment_score,
            record.previous_interaction_score,
            record.ad_category,
        ]
    }

    /// Number of features produced.
    pub fn feature_count(&self) -> usize {
        10
    }

    /// Feature names, matching the extraction order.
    pub fn feature_names(&self) -> [&'static str; 10] {
        [
            "age",
            "gender",
            "location",
            "device_type",
            "impressions",
            "clicks",
            "engagement_duration",
            "sentiment_score",
            "previous_interaction_score",
            "ad_category",
        ]
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_extraction_order() {
        let extractor = FeatureExtractor::new();
        let record = FeatureRecord {
            age: 35.0,
            gender: 0.0,
            location: 1.0,
            device_type: 2.0,
            impressions: 1000.0,
            clicks: 50.0,
            engagement_duration: 60.0,
            sentiment_score: 0.5,
            previous_interaction_score: 0.5,
            ad_category: 1.0,
        };

        let features = extractor.extract(&record);

        assert_eq!(features.len(), extractor.feature_count());
        assert_eq!(features[0], 35.0); // age
        assert_eq!(features[4], 1000.0); // impressions
        assert_eq!(features[5], 50.0); // clicks
        assert_eq!(features[9], 1.0); // ad_category
    }

    #[test]
    fn test_feature_count() {
        let extractor = FeatureExtractor::new();
        assert_eq!(extractor.feature_count(), 10);
        assert_eq!(extractor.feature_names().len(), 10);
    }
}
