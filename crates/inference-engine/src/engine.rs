//! Inference Engine Implementation

use crate::classes::{ClassProbabilities, CLASS_COUNT};
use crate::InferenceError;
use feature_engine::{NormalizedFeatureVector, FEATURE_COUNT};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tract_onnx::prelude::*;

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// Produces a failure probability from scaled features
pub trait BinaryClassifier: Send + Sync {
    /// Sigmoid output of the binary model, in `[0, 1]`
    fn failure_probability(
        &self,
        features: &NormalizedFeatureVector,
    ) -> Result<f64, InferenceError>;
}

/// Produces a distribution over failure types from scaled features
pub trait FailureTypeClassifier: Send + Sync {
    /// Softmax output of the multiclass model
    fn class_probabilities(
        &self,
        features: &NormalizedFeatureVector,
    ) -> Result<ClassProbabilities, InferenceError>;
}

/// An optimized ONNX graph taking a `[1, 6]` f32 input
pub struct OnnxModel {
    /// Model path
    path: PathBuf,
    /// Runnable plan
    plan: OnnxPlan,
}

impl OnnxModel {
    /// Load and optimize an ONNX model
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading ONNX model: {}", path.display());

        let plan = build_plan(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {:#}", path.display(), e)))?;

        info!("Model loaded successfully: {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            plan,
        })
    }

    /// Run one forward pass and flatten the first output
    pub fn run(&self, features: &NormalizedFeatureVector) -> Result<Vec<f32>, InferenceError> {
        let start = std::time::Instant::now();

        let input = Tensor::from_shape(&[1, FEATURE_COUNT], &features.to_f32())
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(format!("{:#}", e)))?;
        let output = outputs
            .first()
            .ok_or_else(|| {
                InferenceError::InferenceFailed("model produced no outputs".to_string())
            })?;
        let values = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .iter()
            .copied()
            .collect();

        debug!(
            "Inference on {} completed in {}us",
            self.path.display(),
            start.elapsed().as_micros()
        );
        Ok(values)
    }

    /// Get model path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn build_plan(path: &Path) -> TractResult<OnnxPlan> {
    tract_onnx::onnx()
        .model_for_path(path)?
        .with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into())?
        .into_optimized()?
        .into_runnable()
}

/// Read a failure probability from raw binary model output
pub fn interpret_binary_output(output: &[f32]) -> Result<f64, InferenceError> {
    let value = *output.first().ok_or_else(|| InferenceError::InvalidOutputShape {
        expected: "at least 1 value".to_string(),
        actual: "0 values".to_string(),
    })?;
    if !value.is_finite() {
        return Err(InferenceError::InferenceFailed(format!(
            "binary model returned {}",
            value
        )));
    }
    Ok(f64::from(value).clamp(0.0, 1.0))
}

/// Read a class distribution from raw multiclass model output
pub fn interpret_class_output(output: &[f32]) -> Result<ClassProbabilities, InferenceError> {
    if output.len() != CLASS_COUNT {
        return Err(InferenceError::InvalidOutputShape {
            expected: format!("{} values", CLASS_COUNT),
            actual: format!("{} values", output.len()),
        });
    }
    let mut values = [0.0; CLASS_COUNT];
    for (slot, raw) in values.iter_mut().zip(output) {
        *slot = f64::from(*raw);
    }
    ClassProbabilities::new(values)
}

/// Binary failure detector backed by an ONNX model
pub struct OnnxBinaryClassifier {
    model: OnnxModel,
}

impl OnnxBinaryClassifier {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        Ok(Self {
            model: OnnxModel::load(path)?,
        })
    }
}

impl BinaryClassifier for OnnxBinaryClassifier {
    fn failure_probability(
        &self,
        features: &NormalizedFeatureVector,
    ) -> Result<f64, InferenceError> {
        interpret_binary_output(&self.model.run(features)?)
    }
}

/// Failure type classifier backed by an ONNX model
pub struct OnnxFailureTypeClassifier {
    model: OnnxModel,
}

impl OnnxFailureTypeClassifier {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        Ok(Self {
            model: OnnxModel::load(path)?,
        })
    }
}

impl FailureTypeClassifier for OnnxFailureTypeClassifier {
    fn class_probabilities(
        &self,
        features: &NormalizedFeatureVector,
    ) -> Result<ClassProbabilities, InferenceError> {
        interpret_class_output(&self.model.run(features)?)
    }
}
