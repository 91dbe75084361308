//! Binary failure decision

use serde::Serialize;

/// Outcome label of the binary detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryLabel {
    #[serde(rename = "not failed")]
    NotFailed,
    #[serde(rename = "failed")]
    Failed,
}

impl BinaryLabel {
    /// Numeric class (0 or 1)
    pub fn as_int(&self) -> u8 {
        match self {
            BinaryLabel::NotFailed => 0,
            BinaryLabel::Failed => 1,
        }
    }

    /// Human-readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryLabel::NotFailed => "not failed",
            BinaryLabel::Failed => "failed",
        }
    }
}

/// Thresholded binary prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryOutcome {
    /// Failure probability from the model
    pub probability: f64,
    /// Thresholded label
    pub label: BinaryLabel,
    /// Probability of the chosen label
    pub confidence: f64,
}

impl BinaryOutcome {
    pub(crate) fn decide(probability: f64, threshold: f64) -> Self {
        let label = if probability >= threshold {
            BinaryLabel::Failed
        } else {
            BinaryLabel::NotFailed
        };
        let confidence = match label {
            BinaryLabel::Failed => probability,
            BinaryLabel::NotFailed => 1.0 - probability,
        };
        Self {
            probability,
            label,
            confidence,
        }
    }

    /// Whether the machine is predicted to fail
    pub fn is_failure(&self) -> bool {
        self.label == BinaryLabel::Failed
    }
}
