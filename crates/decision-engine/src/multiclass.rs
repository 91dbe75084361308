//! Failure type ranking

use crate::config::TOP_K;
use crate::rules::SuggestedOverride;
use inference_engine::{ClassProbabilities, FailureType};
use serde::Serialize;

/// One entry of the top-k ranking
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedClass {
    pub label: FailureType,
    pub prob: f64,
}

/// Failure type decision
#[derive(Debug, Clone, PartialEq)]
pub struct MulticlassOutcome {
    /// Most probable class
    pub prediction: FailureType,
    /// Full distribution
    pub probabilities: ClassProbabilities,
    /// Probability of the predicted class
    pub confidence: f64,
    /// Confidence fell below the ambiguity threshold
    pub ambiguous: bool,
    /// Highest-ranked classes, absent when the model was not consulted
    pub top_k: Option<Vec<RankedClass>>,
    /// Rule-based alternative to the prediction
    pub suggested_override: Option<SuggestedOverride>,
    /// The binary detector ruled out failure, so no ranking was performed
    pub short_circuited: bool,
}

impl MulticlassOutcome {
    /// Outcome reported when the binary detector rules out failure
    pub fn no_failure() -> Self {
        Self {
            prediction: FailureType::NoFailure,
            probabilities: ClassProbabilities::certain(FailureType::NoFailure),
            confidence: 1.0,
            ambiguous: false,
            top_k: None,
            suggested_override: None,
            short_circuited: true,
        }
    }

    /// Rank a distribution and attach the first applicable override
    pub(crate) fn rank(
        probabilities: ClassProbabilities,
        ambiguity_threshold: f64,
        suggest: impl FnOnce(FailureType) -> Option<SuggestedOverride>,
    ) -> Self {
        let top_k = top_k(&probabilities, TOP_K);
        // top_k is never empty: the distribution always has CLASS_COUNT entries
        let best = top_k[0];

        Self {
            prediction: best.label,
            probabilities,
            confidence: best.prob,
            ambiguous: best.prob < ambiguity_threshold,
            suggested_override: suggest(best.label),
            top_k: Some(top_k),
            short_circuited: false,
        }
    }
}

/// The `k` most probable classes, descending; ties keep class order
pub fn top_k(probabilities: &ClassProbabilities, k: usize) -> Vec<RankedClass> {
    let mut ranked: Vec<RankedClass> = probabilities
        .iter()
        .map(|(label, prob)| RankedClass { label, prob })
        .collect();
    // Stable sort, so equal probabilities stay in class order
    ranked.sort_by(|a, b| b.prob.total_cmp(&a.prob));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_AMBIGUITY_THRESHOLD;
    use inference_engine::CLASS_COUNT;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn outcome(values: [f64; CLASS_COUNT]) -> MulticlassOutcome {
        let probs = ClassProbabilities::new(values).unwrap();
        MulticlassOutcome::rank(probs, DEFAULT_AMBIGUITY_THRESHOLD, |_| None)
    }

    #[test]
    fn test_argmax_and_confidence() {
        let o = outcome([0.1, 0.05, 0.05, 0.6, 0.1, 0.1]);
        assert_eq!(o.prediction, FailureType::Power);
        assert_eq!(o.confidence, 0.6);
        assert!(!o.ambiguous);
        assert!(!o.short_circuited);
    }

    #[test]
    fn test_ambiguity_boundary() {
        let rest = (1.0 - 0.2999) / 5.0;
        let o = outcome([0.2999, rest, rest, rest, rest, rest]);
        assert!(o.ambiguous);

        let rest = (1.0 - 0.3) / 5.0;
        let o = outcome([0.3, rest, rest, rest, rest, rest]);
        assert!(!o.ambiguous);
    }

    #[test]
    fn test_ties_follow_class_order() {
        let o = outcome([0.1, 0.1, 0.2, 0.2, 0.2, 0.2]);
        let labels: Vec<_> = o.top_k.unwrap().iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![FailureType::Overstrain, FailureType::Power, FailureType::Random]
        );
        assert_eq!(o.prediction, FailureType::Overstrain);
    }

    #[test]
    fn test_no_failure_outcome() {
        let o = MulticlassOutcome::no_failure();
        assert_eq!(o.prediction, FailureType::NoFailure);
        assert_eq!(o.confidence, 1.0);
        assert!(!o.ambiguous);
        assert_eq!(o.probabilities.sum(), 1.0);
    }

    #[test]
    fn test_ranked_class_serialization() {
        let ranked = RankedClass {
            label: FailureType::ToolWear,
            prob: 0.5,
        };
        let value = serde_json::to_value(ranked).unwrap();
        assert_eq!(value["label"], "Tool Wear Failure");
        assert_eq!(value["prob"], 0.5);
    }

    proptest! {
        #[test]
        fn prop_top_k_invariants(raw in proptest::array::uniform6(0.0f64..1.0)) {
            let total: f64 = raw.iter().sum::<f64>().max(1e-9);
            let values = raw.map(|v| v / total);
            let o = outcome(values);
            let top = o.top_k.unwrap();

            prop_assert_eq!(top.len(), TOP_K);
            prop_assert!(top.windows(2).all(|w| w[0].prob >= w[1].prob));
            let distinct: HashSet<_> = top.iter().map(|r| r.label).collect();
            prop_assert_eq!(distinct.len(), TOP_K);
            prop_assert_eq!(top[0].label, o.prediction);
            prop_assert_eq!(o.ambiguous, o.confidence < DEFAULT_AMBIGUITY_THRESHOLD);
        }
    }
}
