//! Rule-based override suggestions
//!
//! Rules are checked against the raw (unscaled) reading in a fixed order and
//! the first match wins:
//!
//! 1. `tool_wear`: tool wear at or above the limit
//! 2. `heat_dissipation`: small process/air temperature gap at low speed
//! 3. `power`: mechanical power outside the safe band
//! 4. `overstrain`: tool wear x torque above the machine type's limit
//!
//! A rule never suggests the class the model already predicted.

use crate::config::RuleConfig;
use data_validator::{MachineType, PredictionRequest};
use inference_engine::FailureType;
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;

type Predicate = Box<dyn Fn(&PredictionRequest) -> Option<String> + Send + Sync>;

/// An alternative class proposed by a rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedOverride {
    pub label: FailureType,
    /// Name of the rule that fired
    #[serde(skip)]
    pub rule: &'static str,
    /// Why the rule fired
    pub reason: String,
}

/// A named predicate paired with the class it suggests
pub struct OverrideRule {
    name: &'static str,
    suggestion: FailureType,
    /// Returns the reason when the rule holds
    predicate: Predicate,
}

impl OverrideRule {
    pub fn new<F>(name: &'static str, suggestion: FailureType, predicate: F) -> Self
    where
        F: Fn(&PredictionRequest) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name,
            suggestion,
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate against a reading given the model's prediction
    pub fn evaluate(
        &self,
        request: &PredictionRequest,
        prediction: FailureType,
    ) -> Option<SuggestedOverride> {
        if self.suggestion == prediction {
            return None;
        }
        (self.predicate)(request).map(|reason| SuggestedOverride {
            label: self.suggestion,
            rule: self.name,
            reason,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn suggestion(&self) -> FailureType {
        self.suggestion
    }
}

impl fmt::Debug for OverrideRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideRule")
            .field("name", &self.name)
            .field("suggestion", &self.suggestion)
            .finish()
    }
}

/// Ordered rule set, first match wins
#[derive(Debug, Default)]
pub struct OverrideRules {
    rules: Vec<OverrideRule>,
}

impl OverrideRules {
    /// Rule set that never suggests anything
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a rule after all existing ones
    pub fn with_rule(mut self, rule: OverrideRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Standard rule set in its fixed order
    pub fn from_config(config: &RuleConfig) -> Self {
        let tool_wear_min = config.tool_wear_min;
        let max_temp_diff = config.heat_dissipation_max_temp_diff;
        let max_speed = config.heat_dissipation_max_speed;
        let (power_min, power_max) = (config.power_min_watts, config.power_max_watts);
        let strain_limits = [
            (MachineType::L, config.overstrain_limit_l),
            (MachineType::M, config.overstrain_limit_m),
            (MachineType::H, config.overstrain_limit_h),
        ];

        Self::empty()
            .with_rule(OverrideRule::new("tool_wear", FailureType::ToolWear, move |r| {
                (r.tool_wear >= tool_wear_min)
                    .then(|| format!("tool_wear >= {} (raw value: {})", tool_wear_min, r.tool_wear))
            }))
            .with_rule(OverrideRule::new(
                "heat_dissipation",
                FailureType::HeatDissipation,
                move |r| {
                    let diff = temperature_difference(r);
                    (diff < max_temp_diff && r.rotational_speed < max_speed).then(|| {
                        format!(
                            "process/air temperature difference {:.1} K < {} K at {} rpm < {} rpm",
                            diff, max_temp_diff, r.rotational_speed, max_speed
                        )
                    })
                },
            ))
            .with_rule(OverrideRule::new("power", FailureType::Power, move |r| {
                let power = power_watts(r);
                (power < power_min || power > power_max).then(|| {
                    format!(
                        "mechanical power {:.0} W outside [{}, {}] W",
                        power, power_min, power_max
                    )
                })
            }))
            .with_rule(OverrideRule::new(
                "overstrain",
                FailureType::Overstrain,
                move |r| {
                    let limit = strain_limits
                        .iter()
                        .find(|(machine_type, _)| *machine_type == r.machine_type)
                        .map(|(_, limit)| *limit)?;
                    let strain = strain(r);
                    (strain > limit).then(|| {
                        format!(
                            "tool_wear x torque {:.0} min Nm > {} min Nm for type {}",
                            strain, limit, r.machine_type
                        )
                    })
                },
            ))
    }

    /// First suggestion from the ordered rules, if any
    pub fn evaluate(
        &self,
        request: &PredictionRequest,
        prediction: FailureType,
    ) -> Option<SuggestedOverride> {
        self.rules
            .iter()
            .find_map(|rule| rule.evaluate(request, prediction))
    }

    /// Rule names in evaluation order
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(OverrideRule::name).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Process minus air temperature (K)
fn temperature_difference(request: &PredictionRequest) -> f64 {
    request.process_temperature - request.air_temperature
}

/// Torque times angular velocity (W)
fn power_watts(request: &PredictionRequest) -> f64 {
    request.torque * request.rotational_speed * 2.0 * PI / 60.0
}

/// Tool wear times torque (min Nm)
fn strain(request: &PredictionRequest) -> f64 {
    request.tool_wear * request.torque
}
