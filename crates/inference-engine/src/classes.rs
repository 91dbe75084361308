//! Failure Type Classes

use crate::InferenceError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Number of failure type classes
pub const CLASS_COUNT: usize = 6;

/// Failure type predicted by the multiclass model
///
/// Variant order is the label encoding used at training time (alphabetical),
/// which is also the model's output order and the tie-breaking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FailureType {
    #[serde(rename = "Heat Dissipation Failure")]
    HeatDissipation,
    #[serde(rename = "No Failure")]
    NoFailure,
    #[serde(rename = "Overstrain Failure")]
    Overstrain,
    #[serde(rename = "Power Failure")]
    Power,
    #[serde(rename = "Random Failures")]
    Random,
    #[serde(rename = "Tool Wear Failure")]
    ToolWear,
}

impl FailureType {
    /// All classes in model output order
    pub const ALL: [FailureType; CLASS_COUNT] = [
        FailureType::HeatDissipation,
        FailureType::NoFailure,
        FailureType::Overstrain,
        FailureType::Power,
        FailureType::Random,
        FailureType::ToolWear,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            FailureType::HeatDissipation => "Heat Dissipation Failure",
            FailureType::NoFailure => "No Failure",
            FailureType::Overstrain => "Overstrain Failure",
            FailureType::Power => "Power Failure",
            FailureType::Random => "Random Failures",
            FailureType::ToolWear => "Tool Wear Failure",
        }
    }

    /// Position in the model output vector
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Look up a class by its label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Probability per failure type, indexed in model output order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    values: [f64; CLASS_COUNT],
}

impl ClassProbabilities {
    /// Wrap a probability vector, rejecting negative or non-finite entries
    pub fn new(values: [f64; CLASS_COUNT]) -> Result<Self, InferenceError> {
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(InferenceError::InferenceFailed(format!(
                "class probability {} is not a valid probability",
                bad
            )));
        }
        Ok(Self { values })
    }

    /// Distribution with all mass on one class
    pub fn certain(class: FailureType) -> Self {
        let mut values = [0.0; CLASS_COUNT];
        values[class.index()] = 1.0;
        Self { values }
    }

    /// Probability of a class
    pub fn get(&self, class: FailureType) -> f64 {
        self.values[class.index()]
    }

    /// `(class, probability)` pairs in model output order
    pub fn iter(&self) -> impl Iterator<Item = (FailureType, f64)> + '_ {
        FailureType::ALL.into_iter().zip(self.values.iter().copied())
    }

    /// Sum of all probabilities
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Apply `f` to every probability
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            values: self.values.map(f),
        }
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CLASS_COUNT))?;
        for (class, prob) in self.iter() {
            map.serialize_entry(class.label(), &prob)?;
        }
        map.end()
    }
}
