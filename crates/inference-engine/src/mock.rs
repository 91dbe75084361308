//! Fixed-output classifiers for development and tests
//!
//! Each stand-in counts its invocations so callers can assert that a model
//! was (or was not) consulted.

use crate::classes::ClassProbabilities;
use crate::engine::{BinaryClassifier, FailureTypeClassifier};
use crate::InferenceError;
use feature_engine::NormalizedFeatureVector;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Binary classifier that always returns the same probability
#[derive(Debug, Default)]
pub struct FixedBinaryClassifier {
    probability: f64,
    calls: AtomicUsize,
}

impl FixedBinaryClassifier {
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of predictions served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BinaryClassifier for FixedBinaryClassifier {
    fn failure_probability(
        &self,
        _features: &NormalizedFeatureVector,
    ) -> Result<f64, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probability)
    }
}

/// Failure type classifier that always returns the same distribution
#[derive(Debug)]
pub struct FixedFailureTypeClassifier {
    probabilities: ClassProbabilities,
    calls: AtomicUsize,
}

impl FixedFailureTypeClassifier {
    pub fn new(probabilities: ClassProbabilities) -> Self {
        Self {
            probabilities,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of predictions served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FailureTypeClassifier for FixedFailureTypeClassifier {
    fn class_probabilities(
        &self,
        _features: &NormalizedFeatureVector,
    ) -> Result<ClassProbabilities, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probabilities)
    }
}

/// Classifier whose every call fails at run time
#[derive(Debug, Default)]
pub struct BrokenClassifier;

impl BinaryClassifier for BrokenClassifier {
    fn failure_probability(
        &self,
        _features: &NormalizedFeatureVector,
    ) -> Result<f64, InferenceError> {
        Err(InferenceError::InferenceFailed("broken model".to_string()))
    }
}

impl FailureTypeClassifier for BrokenClassifier {
    fn class_probabilities(
        &self,
        _features: &NormalizedFeatureVector,
    ) -> Result<ClassProbabilities, InferenceError> {
        Err(InferenceError::InferenceFailed("broken model".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailureType;

    #[test]
    fn test_call_counting() {
        let features = NormalizedFeatureVector::from_values([0.5; 6]);
        let binary = FixedBinaryClassifier::new(0.7);
        assert_eq!(binary.calls(), 0);
        assert_eq!(binary.failure_probability(&features).unwrap(), 0.7);
        assert_eq!(binary.calls(), 1);

        let multi =
            FixedFailureTypeClassifier::new(ClassProbabilities::certain(FailureType::Power));
        let probs = multi.class_probabilities(&features).unwrap();
        assert_eq!(probs.get(FailureType::Power), 1.0);
        assert_eq!(multi.calls(), 1);
    }
}
