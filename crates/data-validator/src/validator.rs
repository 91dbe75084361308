//! Range Checking for Machine Readings

use crate::error::{InvalidRequest, ValidationError};
use crate::reading::{MachineInput, MachineType, PredictionRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Air temperature valid range (K)
    pub air_temperature_range: (f64, f64),
    /// Process temperature valid range (K)
    pub process_temperature_range: (f64, f64),
    /// Rotational speed valid range (rpm)
    pub rotational_speed_range: (f64, f64),
    /// Torque valid range (Nm)
    pub torque_range: (f64, f64),
    /// Tool wear valid range (min)
    pub tool_wear_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        // Readings only need to be non-negative; out-of-training-range values
        // are handled by the scaler.
        Self {
            air_temperature_range: (0.0, f64::MAX),
            process_temperature_range: (0.0, f64::MAX),
            rotational_speed_range: (0.0, f64::MAX),
            torque_range: (0.0, f64::MAX),
            tool_wear_range: (0.0, f64::MAX),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    fn from_errors(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            fields_checked,
        }
    }
}

/// Validator for incoming machine readings
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Check every field of the input, collecting all failures
    pub fn check(&self, input: &MachineInput) -> ValidationResult {
        let checks = [
            input.machine_type.parse::<MachineType>().map(|_| ()),
            self.validate_range(
                "air_temperature",
                input.air_temperature,
                self.config.air_temperature_range,
            ),
            self.validate_range(
                "process_temperature",
                input.process_temperature,
                self.config.process_temperature_range,
            ),
            self.validate_range(
                "rotational_speed",
                input.rotational_speed,
                self.config.rotational_speed_range,
            ),
            self.validate_range("torque", input.torque, self.config.torque_range),
            self.validate_range("tool_wear", input.tool_wear, self.config.tool_wear_range),
        ];

        let fields_checked = checks.len();
        let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();
        ValidationResult::from_errors(errors, fields_checked)
    }

    /// Validate a raw input, producing a typed request
    pub fn validate(&self, input: MachineInput) -> Result<PredictionRequest, InvalidRequest> {
        let result = self.check(&input);
        if !result.valid {
            debug!(
                product_id = %input.product_id,
                errors = result.errors.len(),
                "Rejected machine reading"
            );
            return Err(InvalidRequest {
                errors: result.errors,
            });
        }

        let machine_type = input.machine_type.parse::<MachineType>()?;
        Ok(PredictionRequest {
            product_id: input.product_id,
            machine_type,
            air_temperature: input.air_temperature,
            process_temperature: input.process_temperature,
            rotational_speed: input.rotational_speed,
            torque: input.torque,
            tool_wear: input.tool_wear,
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
