//! Conversion Insights Backend Library
//!
//! REST backend serving precomputed analytics for an ad-conversion
//! dataset plus a single-record conversion scoring endpoint with a
//! rule-based fallback when no trained model artifact is available.

pub mod config;
pub mod dataset;
pub mod feature_extractor;
pub mod fixtures;
pub mod models;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use feature_extractor::FeatureExtractor;
pub use models::loader::ModelLoader;
pub use models::registry::ModelRegistry;
pub use models::scorer::ConversionScorer;
pub use server::AppState;
pub use types::{FeatureRecord, ModelId, PredictionResult};
