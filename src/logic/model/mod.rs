//! Model Module - Classifier Port
//!
//! The core only knows the `Classifier` trait. Concrete models are bound
//! at startup: a rule-based classifier, an ONNX model (feature `onnx`),
//! or nothing at all.

pub mod rules;
#[cfg(feature = "onnx")]
pub mod onnx;

use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureVector, LayoutMismatchError};

// Re-export common types
pub use rules::{RuleClassifier, RuleLimits};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

// ============================================================================
// VERDICT
// ============================================================================

/// Classifier output for the latest record. Both parts absent = unknown.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Verdict {
    /// 0 = normal, 1 = failure
    pub label: Option<u8>,
    /// Failure probability in [0, 1]
    pub probability: Option<f64>,
}

impl Verdict {
    /// Unknown verdict (no classifier, or it failed)
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn new(label: u8, probability: f64) -> Self {
        Self {
            label: Some(label),
            probability: Some(probability),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.label.is_none() && self.probability.is_none()
    }

    pub fn is_failure(&self) -> bool {
        self.label == Some(1)
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("invalid features: {0}")]
    InvalidFeatures(String),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

// ============================================================================
// CLASSIFIER PORT
// ============================================================================

/// Prediction capability bound to an external model
pub trait Classifier: Send {
    /// Short name for logs and snapshots
    fn name(&self) -> &str;

    fn predict(&self, features: &FeatureVector) -> Result<Verdict, ClassifierError>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn predict(&self, features: &FeatureVector) -> Result<Verdict, ClassifierError> {
        (**self).predict(features)
    }
}

/// Shared input checks for classifiers
pub fn check_features(features: &FeatureVector) -> Result<(), ClassifierError> {
    features.validate()?;
    if !features.is_finite() {
        return Err(ClassifierError::InvalidFeatures(format!(
            "non-finite value in {:?}",
            features.values
        )));
    }
    Ok(())
}
