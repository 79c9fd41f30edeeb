//! Static analytics payloads served by the read-only endpoints.
//!
//! Chart data comes from JSON files embedded at compile time and parsed
//! once at startup; the PCA scatter is generated once from a fixed seed
//! so every request sees the same points. Nothing here is recomputed per
//! request.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use serde_json::Value;

/// Seed for the deterministic PCA scatter fixture.
const PCA_SCATTER_SEED: u64 = 42;
const PCA_SCATTER_POINTS: usize = 200;

/// Offline evaluation metrics for one trained model.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelMetrics {
    pub name: &'static str,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub roc_auc: f64,
    pub training_time: f64,
}

/// Evaluation metrics for the five trained models.
pub const MODEL_METRICS: [ModelMetrics; 5] = [
    ModelMetrics {
        name: "Random Forest",
        accuracy: 0.9667,
        precision: 0.9375,
        recall: 0.6250,
        f1_score: 0.7500,
        roc_auc: 0.9905,
        training_time: 0.2242,
    },
    ModelMetrics {
        name: "Gradient Boosting",
        accuracy: 0.5400,
        precision: 0.5268,
        recall: 0.4097,
        f1_score: 0.4609,
        roc_auc: 0.5899,
        training_time: 0.5111,
    },
    ModelMetrics {
        name: "Logistic Regression",
        accuracy: 0.9533,
        precision: 0.6818,
        recall: 1.0000,
        f1_score: 0.8108,
        roc_auc: 0.9981,
        training_time: 0.0017,
    },
    ModelMetrics {
        name: "SVM",
        accuracy: 0.9700,
        precision: 0.7692,
        recall: 1.0000,
        f1_score: 0.8696,
        roc_auc: 0.9998,
        training_time: 0.0117,
    },
    ModelMetrics {
        name: "Logistic Regression (PCA)",
        accuracy: 0.7733,
        precision: 0.3647,
        recall: 0.6889,
        f1_score: 0.4769,
        roc_auc: 0.8208,
        training_time: 0.0019,
    },
];

/// Schema description of the source dataset.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DatasetInfo {
    pub name: &'static str,
    pub records: u64,
    pub features: [&'static str; 15],
    pub target: &'static str,
}

pub const DATASET_INFO: DatasetInfo = DatasetInfo {
    name: "ad_campaign_data.csv",
    records: 100_000,
    features: [
        "user_id",
        "age",
        "gender",
        "location",
        "device_type",
        "ad_id",
        "ad_category",
        "impressions",
        "clicks",
        "conversions",
        "engagement_duration",
        "interaction_timestamps",
        "previous_interaction_score",
        "sentiment_score",
        "tfidf_0 through tfidf_20",
    ],
    target: "conversions",
};

/// One point of the PCA scatter fixture.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PcaPoint {
    pub x: f64,
    pub y: f64,
}

/// Seeded 2-D projection fixture with its variance constants.
#[derive(Debug, Clone, Serialize)]
pub struct PcaProjection {
    pub points: Vec<PcaPoint>,
    pub explained_variance: [f64; 2],
    pub total_variance: f64,
}

impl PcaProjection {
    fn generate(seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let x_noise = Normal::new(0.0, 1500.0).context("invalid x distribution")?;
        let y_noise = Normal::new(0.0, 1200.0).context("invalid y distribution")?;
        let x_offsets = [-2000.0, 0.0, 2000.0];
        let y_offsets = [-1500.0, 0.0, 1500.0];

        let points = (0..PCA_SCATTER_POINTS)
            .map(|_| {
                let x = x_noise.sample(&mut rng) + x_offsets[rng.gen_range(0..x_offsets.len())];
                let y = y_noise.sample(&mut rng) + y_offsets[rng.gen_range(0..y_offsets.len())];
                PcaPoint { x, y }
            })
            .collect();

        Ok(Self {
            points,
            explained_variance: [0.65, 0.25],
            total_variance: 0.90,
        })
    }
}

/// All chart payloads, parsed and generated once at startup.
pub struct ChartFixtures {
    pub roc_curves: Value,
    pub confusion_matrices: Value,
    pub feature_importance: Value,
    pub missing_data: Value,
    pub cluster_summary: Value,
    pub pca_projection: PcaProjection,
}

impl ChartFixtures {
    pub fn load() -> Result<Self> {
        Ok(Self {
            roc_curves: parse_fixture("roc_curves", include_str!("../fixtures/roc_curves.json"))?,
            confusion_matrices: parse_fixture(
                "confusion_matrices",
                include_str!("../fixtures/confusion_matrices.json"),
            )?,
            feature_importance: parse_fixture(
                "feature_importance",
                include_str!("../fixtures/feature_importance.json"),
            )?,
            missing_data: parse_fixture(
                "missing_data",
                include_str!("../fixtures/missing_data.json"),
            )?,
            cluster_summary: parse_fixture("clusters", include_str!("../fixtures/clusters.json"))?,
            pca_projection: PcaProjection::generate(PCA_SCATTER_SEED)?,
        })
    }
}

fn parse_fixture(name: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("invalid embedded fixture {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::prediction::ModelId;

    #[test]
    fn test_model_metrics_table() {
        assert_eq!(MODEL_METRICS.len(), 5);
        assert_eq!(MODEL_METRICS[0].name, "Random Forest");
        assert_eq!(MODEL_METRICS[3].roc_auc, 0.9998);
    }

    #[test]
    fn test_fixtures_parse() {
        let fixtures = ChartFixtures::load().unwrap();

        for id in ModelId::ALL {
            let curve = &fixtures.roc_curves[id.as_str()];
            assert!(curve["auc"].is_number(), "missing roc for {id}");
            assert_eq!(
                curve["fpr"].as_array().unwrap().len(),
                curve["tpr"].as_array().unwrap().len()
            );

            let matrix = fixtures.confusion_matrices[id.as_str()].as_array().unwrap();
            assert_eq!(matrix.len(), 2);
        }

        assert_eq!(fixtures.cluster_summary["silhouette_score"], 0.6523);
        assert_eq!(
            fixtures.missing_data["missing_counts"].as_array().unwrap().len(),
            fixtures.missing_data["columns"].as_array().unwrap().len()
        );
    }

    #[test]
    fn test_pca_projection_deterministic() {
        let a = PcaProjection::generate(PCA_SCATTER_SEED).unwrap();
        let b = PcaProjection::generate(PCA_SCATTER_SEED).unwrap();

        assert_eq!(a.points.len(), 200);
        assert_eq!(a.points[0].x, b.points[0].x);
        assert_eq!(a.points[199].y, b.points[199].y);
        assert_eq!(a.explained_variance, [0.65, 0.25]);
    }
}
