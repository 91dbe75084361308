//! Prediction Decision Engine
//!
//! Turns raw classifier scores into the decisions the service reports:
//! binary labels with confidence, failure type rankings, ambiguity flags and
//! rule-based override suggestions.

mod binary;
mod config;
mod multiclass;
mod rules;

pub use binary::{BinaryLabel, BinaryOutcome};
pub use config::{
    DecisionConfig, RuleConfig, DEFAULT_AMBIGUITY_THRESHOLD, DEFAULT_BINARY_THRESHOLD, TOP_K,
};
pub use multiclass::{MulticlassOutcome, RankedClass};
pub use rules::{OverrideRule, OverrideRules, SuggestedOverride};

use data_validator::PredictionRequest;
use inference_engine::ClassProbabilities;
use thiserror::Error;
use tracing::{debug, info};

/// Decision engine errors
#[derive(Debug, Clone, Error)]
pub enum DecisionError {
    #[error("Invalid decision config: {0}")]
    InvalidConfig(String),
}

/// Applies thresholds and override rules to classifier output
pub struct DecisionEngine {
    config: DecisionConfig,
    rules: OverrideRules,
}

impl DecisionEngine {
    /// Create an engine with validated thresholds and a rule set
    pub fn new(config: DecisionConfig, rules: OverrideRules) -> Result<Self, DecisionError> {
        config.validate()?;
        info!(
            "Decision engine ready: binary_threshold={}, ambiguity_threshold={}, rules={:?}",
            config.binary_threshold,
            config.ambiguity_threshold,
            rules.names()
        );
        Ok(Self { config, rules })
    }

    /// Create an engine with the standard rule order built from `rule_config`
    pub fn from_config(
        config: DecisionConfig,
        rule_config: &RuleConfig,
    ) -> Result<Self, DecisionError> {
        Self::new(config, OverrideRules::from_config(rule_config))
    }

    /// Label a failure probability
    pub fn decide_binary(&self, probability: f64) -> BinaryOutcome {
        let outcome = BinaryOutcome::decide(probability, self.config.binary_threshold);
        debug!(
            "Binary decision: p={:.4} -> {} (conf={:.4})",
            probability,
            outcome.label.as_str(),
            outcome.confidence
        );
        outcome
    }

    /// Decide the failure type
    ///
    /// `classify` is only invoked when the binary outcome is a failure; a
    /// "not failed" binary outcome short-circuits to "No Failure".
    pub fn decide_type<F, E>(
        &self,
        binary: &BinaryOutcome,
        request: &PredictionRequest,
        classify: F,
    ) -> Result<MulticlassOutcome, E>
    where
        F: FnOnce() -> Result<ClassProbabilities, E>,
    {
        if !binary.is_failure() {
            debug!("Binary predicted not failed; skipping failure type model");
            return Ok(MulticlassOutcome::no_failure());
        }

        let probabilities = classify()?;
        let outcome = MulticlassOutcome::rank(
            probabilities,
            self.config.ambiguity_threshold,
            |prediction| self.rules.evaluate(request, prediction),
        );
        debug!(
            "Failure type decision: {} (conf={:.4}, ambiguous={}, override={:?})",
            outcome.prediction,
            outcome.confidence,
            outcome.ambiguous,
            outcome.suggested_override.as_ref().map(|o| o.label)
        );
        Ok(outcome)
    }

    /// Active thresholds
    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }
}
