//! Model registry: the immutable-after-init lookup table of trained
//! classifier pipelines.
//!
//! Populated once at startup and passed by reference into the request
//! layer; nothing mutates or reloads entries while the server runs.

use crate::models::preprocess::{PcaTransform, StandardScaler};
use crate::types::prediction::ModelId;
use anyhow::Result;
use std::collections::HashMap;

/// A trained classifier able to estimate the positive-class probability
/// for one feature vector.
pub trait Classifier: Send + Sync {
    fn positive_probability(&self, features: &[f32]) -> Result<f64>;
}

/// One registry entry: classifier plus the preprocessing artifacts that
/// were exported alongside it. The scaler is optional; the reducer is
/// populated only for the PCA-backed model.
pub struct RegistryEntry {
    pub classifier: Box<dyn Classifier>,
    pub scaler: Option<StandardScaler>,
    pub reducer: Option<PcaTransform>,
}

impl RegistryEntry {
    pub fn new(classifier: Box<dyn Classifier>) -> Self {
        Self {
            classifier,
            scaler: None,
            reducer: None,
        }
    }

    pub fn with_scaler(mut self, scaler: Option<StandardScaler>) -> Self {
        self.scaler = scaler;
        self
    }

    pub fn with_reducer(mut self, reducer: Option<PcaTransform>) -> Self {
        self.reducer = reducer;
        self
    }
}

/// Keyed store of loaded model entries. Absence of an entry is a normal
/// state, not an error.
#[derive(Default)]
pub struct ModelRegistry {
    entries: HashMap<ModelId, RegistryEntry>,
}

impl ModelRegistry {
    pub fn new(entries: HashMap<ModelId, RegistryEntry>) -> Self {
        Self { entries }
    }

    /// A registry with no loaded models; every score call takes the
    /// fallback path.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, model: ModelId) -> Option<&RegistryEntry> {
        self.entries.get(&model)
    }

    pub fn contains(&self, model: ModelId) -> bool {
        self.entries.contains_key(&model)
    }

    /// Loaded identifiers in canonical order.
    pub fn loaded_ids(&self) -> Vec<ModelId> {
        ModelId::ALL
            .into_iter()
            .filter(|id| self.entries.contains_key(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier(f64);

    impl Classifier for FixedClassifier {
        fn positive_probability(&self, _features: &[f32]) -> Result<f64> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = ModelRegistry::empty();
        assert!(registry.is_empty());
        assert!(!registry.contains(ModelId::Svm));
        assert!(registry.loaded_ids().is_empty());
    }

    #[test]
    fn test_loaded_ids_canonical_order() {
        let mut entries = HashMap::new();
        entries.insert(
            ModelId::PcaLr,
            RegistryEntry::new(Box::new(FixedClassifier(0.7))),
        );
        entries.insert(
            ModelId::RandomForest,
            RegistryEntry::new(Box::new(FixedClassifier(0.2))),
        );
        let registry = ModelRegistry::new(entries);

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.loaded_ids(),
            vec![ModelId::RandomForest, ModelId::PcaLr]
        );
    }
}
