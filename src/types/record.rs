//! Feature record for ad-conversion scoring

use serde::{Deserialize, Serialize};

/// A single ad-interaction record to be scored for conversion likelihood.
///
/// All fields are numeric; coded categorical fields (gender, location,
/// device_type, ad_category) carry integer codes. No range is enforced,
/// only numeric convertibility at the request boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// User age in years
    pub age: f64,

    /// Gender code
    pub gender: f64,

    /// Location code
    pub location: f64,

    /// Device type code
    pub device_type: f64,

    /// Ad impressions served
    pub impressions: f64,

    /// Clicks recorded
    pub clicks: f64,

    /// Engagement duration in seconds
    pub engagement_duration: f64,

    /// Sentiment score, conventionally in [-1, 1] or [0, 1]
    pub sentiment_score: f64,

    /// Score from previous interactions
    pub previous_interaction_score: f64,

    /// Ad category code
    pub ad_category: f64,
}

impl FeatureRecord {
    /// Click-through rate with a floor of one impression.
    pub fn click_through_rate(&self) -> f64 {
        self.clicks / self.impressions.max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureRecord {
        FeatureRecord {
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
        }
    }

    #[test]
    fn test_record_serialization() {
        let record = sample();

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: FeatureRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }

    #[test]
    fn test_click_through_rate() {
        let record = sample();
        assert_eq!(record.click_through_rate(), 0.05);
    }

    #[test]
    fn test_click_through_rate_zero_impressions() {
        let record = FeatureRecord {
            impressions: 0.0,
            clicks: 0.0,
            ..sample()
        };
        assert_eq!(record.click_through_rate(), 0.0);
    }
}
