//! ONNX Inference Engine
//!
//! Wraps the binary failure detector and the failure-type classifier behind
//! small traits, with tract-onnx backed implementations and fixed-output
//! stand-ins for tests.

mod classes;
mod engine;
pub mod mock;

pub use classes::{ClassProbabilities, FailureType, CLASS_COUNT};
pub use engine::{
    interpret_binary_output, interpret_class_output, BinaryClassifier, FailureTypeClassifier,
    OnnxBinaryClassifier, OnnxFailureTypeClassifier, OnnxModel,
};

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    /// A required artifact (model or scaler) was never loaded
    #[error("{0} is not loaded")]
    NotLoaded(&'static str),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid output shape: expected {expected}, got {actual}")]
    InvalidOutputShape { expected: String, actual: String },
}

impl InferenceError {
    /// Whether the failure is a missing artifact rather than a broken one
    pub fn is_unavailable(&self) -> bool {
        matches!(self, InferenceError::NotLoaded(_))
    }
}
