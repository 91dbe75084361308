//! Decision thresholds and rule parameters

use crate::DecisionError;
use serde::{Deserialize, Serialize};

/// Failure probability at or above which a machine is labelled "failed"
pub const DEFAULT_BINARY_THRESHOLD: f64 = 0.05;

/// Top confidence below which a failure type prediction is ambiguous
pub const DEFAULT_AMBIGUITY_THRESHOLD: f64 = 0.3;

/// Number of ranked classes reported
pub const TOP_K: usize = 3;

/// Decision thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Binary failure threshold
    pub binary_threshold: f64,
    /// Multiclass ambiguity threshold
    pub ambiguity_threshold: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            binary_threshold: DEFAULT_BINARY_THRESHOLD,
            ambiguity_threshold: DEFAULT_AMBIGUITY_THRESHOLD,
        }
    }
}

impl DecisionConfig {
    /// Check both thresholds lie in `[0, 1]`
    pub fn validate(&self) -> Result<(), DecisionError> {
        for (name, value) in [
            ("binary_threshold", self.binary_threshold),
            ("ambiguity_threshold", self.ambiguity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DecisionError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Parameters of the override rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Tool wear (min) from which tool wear failure is suggested
    pub tool_wear_min: f64,
    /// Process/air temperature gap (K) below which heat dissipation is at risk
    pub heat_dissipation_max_temp_diff: f64,
    /// Rotational speed (rpm) below which heat dissipation is at risk
    pub heat_dissipation_max_speed: f64,
    /// Lower bound of safe mechanical power (W)
    pub power_min_watts: f64,
    /// Upper bound of safe mechanical power (W)
    pub power_max_watts: f64,
    /// Tool wear x torque limit (min Nm) for L machines
    pub overstrain_limit_l: f64,
    /// Tool wear x torque limit (min Nm) for M machines
    pub overstrain_limit_m: f64,
    /// Tool wear x torque limit (min Nm) for H machines
    pub overstrain_limit_h: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            tool_wear_min: 200.0,
            heat_dissipation_max_temp_diff: 8.6,
            heat_dissipation_max_speed: 1380.0,
            power_min_watts: 3500.0,
            power_max_watts: 9000.0,
            overstrain_limit_l: 11_000.0,
            overstrain_limit_m: 12_000.0,
            overstrain_limit_h: 13_000.0,
        }
    }
}
