//! ONNX Classifier - trained model via ONNX Runtime
//!
//! Expects a model exported with one float input of shape
//! `[1, FEATURE_COUNT]` and a probability output, either
//! `[p_normal, p_failure]` or a single `p_failure`.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::{check_features, Classifier, ClassifierError, Verdict};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// Probability at or above which the label is 1
const DECISION_THRESHOLD: f64 = 0.5;

/// Classifier backed by an ONNX session
pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
    model_path: String,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("model_path", &self.model_path)
            .field("output_name", &self.output_name)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: &str) -> Result<Self, ClassifierError> {
        log::info!("Loading ONNX model from: {}", model_path);

        if !Path::new(model_path).exists() {
            return Err(ClassifierError::ModelUnavailable(format!(
                "Model not found: {}",
                model_path
            )));
        }

        let session = Session::builder()
            .map_err(|e| ClassifierError::ModelUnavailable(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::ModelUnavailable(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ClassifierError::ModelUnavailable(format!("Failed to load model: {}", e)))?;

        // Probability tensors come last in exported classifiers.
        let output_name = session
            .outputs
            .last()
            .map(|o| o.name.clone())
            .ok_or_else(|| ClassifierError::ModelUnavailable("No output defined".to_string()))?;

        log::info!("ONNX model loaded (output: {})", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            model_path: model_path.to_string(),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn predict(&self, features: &FeatureVector) -> Result<Verdict, ClassifierError> {
        check_features(features)?;

        let input: Vec<f32> = features.values.iter().map(|&v| v as f32).collect();
        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), input)
            .map_err(|e| ClassifierError::Inference(format!("Array error: {}", e)))?;
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ClassifierError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassifierError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ClassifierError::Inference("No output".to_string()))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Extract error: {}", e)))?;

        let probability = match data {
            [_, p_failure] => f64::from(*p_failure),
            [p_failure] => f64::from(*p_failure),
            other => {
                return Err(ClassifierError::Inference(format!(
                    "unexpected output width {}",
                    other.len()
                )))
            }
        };

        if !(0.0..=1.0).contains(&probability) {
            return Err(ClassifierError::Inference(format!(
                "probability out of range: {}",
                probability
            )));
        }

        let label = u8::from(probability >= DECISION_THRESHOLD);
        Ok(Verdict::new(label, probability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file() {
        let result = OnnxClassifier::load("/nonexistent/model.onnx");
        assert!(matches!(result, Err(ClassifierError::ModelUnavailable(_))));
    }
}
