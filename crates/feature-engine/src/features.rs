//! Feature Vector Assembly

use crate::FEATURE_COUNT;
use serde::{Deserialize, Serialize};

/// Scaled model input, ordered as [`crate::FEATURE_NAMES`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl NormalizedFeatureVector {
    /// Wrap already-scaled values
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Scaled values
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Values as `f32`, the dtype the ONNX graphs expect
    pub fn to_f32(&self) -> [f32; FEATURE_COUNT] {
        self.values.map(|v| v as f32)
    }

    /// Whether every value lies in `[0, 1]`
    pub fn is_unit_range(&self) -> bool {
        self.values.iter().all(|v| (0.0..=1.0).contains(v))
    }
}
