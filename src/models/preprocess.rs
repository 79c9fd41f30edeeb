//! Feature preprocessing artifacts exported from model training.
//!
//! Scaler and PCA parameters are stored as small JSON files next to the
//! classifier graphs; both transforms are plain arithmetic over the
//! feature vector.

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Per-feature standardization parameters (`(x - mean) / scale`).
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Load scaler parameters from a JSON artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scaler artifact {}", path.display()))?;
        let scaler: StandardScaler = serde_json::from_str(&raw)
            .with_context(|| format!("invalid scaler artifact {}", path.display()))?;
        ensure!(
            scaler.mean.len() == scaler.scale.len(),
            "scaler mean/scale length mismatch ({} vs {})",
            scaler.mean.len(),
            scaler.scale.len()
        );
        Ok(scaler)
    }

    /// Standardize a feature vector.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        ensure!(
            features.len() == self.mean.len(),
            "scaler expects {} features, got {}",
            self.mean.len(),
            features.len()
        );
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&x, (&mean, &scale))| (x - mean) / scale)
            .collect())
    }
}

/// PCA projection parameters: center on `mean`, project onto `components`.
#[derive(Debug, Clone, Deserialize)]
pub struct PcaTransform {
    pub mean: Vec<f64>,
    /// One row per output component, each of input dimensionality.
    pub components: Vec<Vec<f64>>,
}

impl PcaTransform {
    /// Load PCA parameters from a JSON artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read PCA artifact {}", path.display()))?;
        let pca: PcaTransform = serde_json::from_str(&raw)
            .with_context(|| format!("invalid PCA artifact {}", path.display()))?;
        ensure!(!pca.components.is_empty(), "PCA artifact has no components");
        for row in &pca.components {
            ensure!(
                row.len() == pca.mean.len(),
                "PCA component length {} does not match mean length {}",
                row.len(),
                pca.mean.len()
            );
        }
        Ok(pca)
    }

    /// Number of output components.
    pub fn output_dim(&self) -> usize {
        self.components.len()
    }

    /// Project a feature vector into component space.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        ensure!(
            features.len() == self.mean.len(),
            "PCA expects {} features, got {}",
            self.mean.len(),
            features.len()
        );
        let centered: Vec<f64> = features
            .iter()
            .zip(&self.mean)
            .map(|(&x, &mean)| x - mean)
            .collect();
        Ok(self
            .components
            .iter()
            .map(|row| row.iter().zip(&centered).map(|(&c, &x)| c * x).sum())
            .collect())
    }
}
