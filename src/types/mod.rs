//! Type definitions for the conversion insights backend

pub mod prediction;
pub mod record;

pub use prediction::{Confidence, ModelId, PredictionLabel, PredictionResult};
pub use record::FeatureRecord;
