//! ONNX classifier loading and execution.
//!
//! Probes the well-known artifact locations for each model identifier at
//! startup; anything missing or unreadable is logged and skipped.

use crate::models::preprocess::{PcaTransform, StandardScaler};
use crate::models::registry::{Classifier, ModelRegistry, RegistryEntry};
use crate::types::prediction::ModelId;
use anyhow::{anyhow, bail, Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock};
use tracing::{debug, info, warn};

/// Classifier artifact file for a model identifier.
pub fn classifier_path(models_dir: &Path, model: ModelId) -> PathBuf {
    models_dir.join(format!("{}_model.onnx", model.as_str()))
}

/// Scaler artifact file for a model identifier.
pub fn scaler_path(scalers_dir: &Path, model: ModelId) -> PathBuf {
    scalers_dir.join(format!("{}_scaler.json", model.as_str()))
}

/// The shared PCA transformer artifact used by the PCA-backed model.
pub fn reducer_path(scalers_dir: &Path) -> PathBuf {
    scalers_dir.join("pca_transformer.json")
}

fn ensure_runtime() -> Result<()> {
    static INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();
    INIT.get_or_init(|| {
        ort::init()
            .commit()
            .map(|_| info!("ONNX Runtime initialized"))
            .map_err(|e| e.to_string())
    })
    .clone()
    .map_err(|e| anyhow!("ONNX Runtime initialization failed: {e}"))
}

/// A loaded ONNX classifier session with its resolved I/O names.
pub struct OnnxClassifier {
    name: String,
    session: RwLock<Session>,
    input_name: String,
    output_name: String,
}

impl Classifier for OnnxClassifier {
    fn positive_probability(&self, features: &[f32]) -> Result<f64> {
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("failed to create input tensor")?;

        let mut session = self
            .session
            .write()
            .map_err(|e| anyhow!("classifier session lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;

        extract_positive_probability(&outputs, &self.output_name, &self.name)
    }
}

/// Extract the positive-class probability from classifier output.
/// Handles both tensor outputs and the seq(map) format produced by
/// sklearn-onnx ZipMap nodes.
fn extract_positive_probability(
    outputs: &SessionOutputs,
    output_name: &str,
    model_name: &str,
) -> Result<f64> {
    if let Some(output) = outputs.get(output_name) {
        let dtype = output.dtype();

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            let prob = positive_prob_from_tensor(&dims, data);
            debug!(model = %model_name, prob = prob, "extracted probability from tensor");
            return Ok(prob);
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(prob) = probability_from_sequence_map(output, model_name) {
                return Ok(prob);
            }
        }
    }

    // The named output was absent or unusable; try the remaining outputs.
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }

        let dtype = output.dtype();

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            let prob = positive_prob_from_tensor(&dims, data);
            debug!(model = %model_name, output = %name, prob = prob, "extracted probability from tensor (fallback output)");
            return Ok(prob);
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(prob) = probability_from_sequence_map(&output, model_name) {
                return Ok(prob);
            }
        }
    }

    bail!("no probability output found for model {model_name}")
}

/// Extract the positive-class probability from a seq(map(int64, float)).
fn probability_from_sequence_map(output: &DynValue, model_name: &str) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow!("failed to downcast output to sequence: {e}"))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let map_value = maps.first().ok_or_else(|| anyhow!("empty output sequence"))?;

    let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            debug!(model = %model_name, prob = *prob, "extracted probability from seq(map)");
            return Ok(*prob as f64);
        }
    }

    // Only the negative class present; report its complement.
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    bail!("no class probability found in output map")
}

/// Read the positive-class probability out of tensor data of shape
/// `[batch, classes]`, `[classes]`, or `[batch, 1]`.
fn positive_prob_from_tensor(dims: &[i64], data: &[f32]) -> f64 {
    let classes = match dims {
        [_, n] => *n as usize,
        [n] => *n as usize,
        _ => 0,
    };

    if classes >= 2 {
        data[1] as f64
    } else if classes == 1 {
        data[0] as f64
    } else {
        data.last().map(|&v| v as f64).unwrap_or(0.5)
    }
}

/// Loader that populates a [`ModelRegistry`] from artifact directories.
pub struct ModelLoader {
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a loader with default settings (1 inference thread).
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a loader with the given per-session thread count.
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self { onnx_threads }
    }

    /// Probe all well-known artifact paths and build the registry.
    /// Missing or unreadable artifacts are skipped, never fatal.
    pub fn load_registry(&self, models_dir: &Path, scalers_dir: &Path) -> ModelRegistry {
        let mut entries = HashMap::new();

        for model in ModelId::ALL {
            let path = classifier_path(models_dir, model);
            if !path.exists() {
                warn!(model = %model, path = %path.display(), "model file not found");
                continue;
            }

            match self.load_classifier(&path, model) {
                Ok(classifier) => {
                    let scaler = self.load_scaler(scalers_dir, model);
                    let reducer = if model == ModelId::PcaLr {
                        self.load_reducer(scalers_dir)
                    } else {
                        None
                    };
                    entries.insert(
                        model,
                        RegistryEntry::new(Box::new(classifier))
                            .with_scaler(scaler)
                            .with_reducer(reducer),
                    );
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "failed to load model, skipping");
                }
            }
        }

        info!(
            count = entries.len(),
            "loaded {} of {} models from {}",
            entries.len(),
            ModelId::ALL.len(),
            models_dir.display()
        );

        ModelRegistry::new(entries)
    }

    fn load_classifier(&self, path: &Path, model: ModelId) -> Result<OnnxClassifier> {
        ensure_runtime()?;

        info!(model = %model, path = %path.display(), threads = self.onnx_threads, "loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("failed to load model from {}", path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            model = %model,
            input = %input_name,
            output = %output_name,
            "model loaded successfully"
        );

        Ok(OnnxClassifier {
            name: model.as_str().to_string(),
            session: RwLock::new(session),
            input_name,
            output_name,
        })
    }

    fn load_scaler(&self, scalers_dir: &Path, model: ModelId) -> Option<StandardScaler> {
        let path = scaler_path(scalers_dir, model);
        if !path.exists() {
            return None;
        }
        match StandardScaler::load(&path) {
            Ok(scaler) => {
                info!(model = %model, "loaded feature scaler");
                Some(scaler)
            }
            Err(e) => {
                warn!(model = %model, error = %e, "failed to load scaler, continuing without");
                None
            }
        }
    }

    fn load_reducer(&self, scalers_dir: &Path) -> Option<PcaTransform> {
        let path = reducer_path(scalers_dir);
        if !path.exists() {
            return None;
        }
        match PcaTransform::load(&path) {
            Ok(pca) => {
                info!("loaded PCA transformer");
                Some(pca)
            }
            Err(e) => {
                warn!(error = %e, "failed to load PCA transformer, continuing without");
                None
            }
        }
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths() {
        let models = Path::new("models");
        let scalers = Path::new("models/scalers");

        assert_eq!(
            classifier_path(models, ModelId::RandomForest),
            PathBuf::from("models/random_forest_model.onnx")
        );
        assert_eq!(
            scaler_path(scalers, ModelId::PcaLr),
            PathBuf::from("models/scalers/pca_lr_scaler.json")
        );
        assert_eq!(
            reducer_path(scalers),
            PathBuf::from("models/scalers/pca_transformer.json")
        );
    }

    #[test]
    fn test_missing_artifacts_yield_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ModelLoader::new();

        let registry = loader.load_registry(dir.path(), &dir.path().join("scalers"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_tensor_probability_extraction() {
        // [batch, classes]: positive class at index 1
        assert_eq!(positive_prob_from_tensor(&[1, 2], &[0.3, 0.7]), 0.7f32 as f64);
        // [batch, 1]: single probability
        assert_eq!(positive_prob_from_tensor(&[1, 1], &[0.42]), 0.42f32 as f64);
        // [classes]
        assert_eq!(positive_prob_from_tensor(&[2], &[0.1, 0.9]), 0.9f32 as f64);
    }
}
