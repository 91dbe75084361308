//! Machine Reading Types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Number of model input features
pub const FEATURE_COUNT: usize = 6;

/// Model input feature order (must match the order used at training time)
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "type",
    "air_temperature",
    "process_temperature",
    "rotational_speed",
    "torque",
    "tool_wear",
];

/// Product quality variant of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineType {
    /// High quality
    H,
    /// Low quality
    L,
    /// Medium quality
    M,
}

impl MachineType {
    /// Ordinal code assigned by the training-time label encoder (alphabetical)
    pub fn code(&self) -> u8 {
        match self {
            MachineType::H => 0,
            MachineType::L => 1,
            MachineType::M => 2,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineType::H => "H",
            MachineType::L => "L",
            MachineType::M => "M",
        }
    }
}

impl FromStr for MachineType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H" => Ok(MachineType::H),
            "L" => Ok(MachineType::L),
            "M" => Ok(MachineType::M),
            _ => Err(ValidationError::InvalidMachineType(s.to_string())),
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw request body as it arrives over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineInput {
    pub product_id: String,
    #[serde(rename = "type")]
    pub machine_type: String,
    pub air_temperature: f64,
    pub process_temperature: f64,
    pub rotational_speed: f64,
    pub torque: f64,
    pub tool_wear: f64,
}

/// Validated machine reading
///
/// Only [`crate::Validator`] constructs these, so every instance satisfies
/// the configured ranges and carries a known machine type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub product_id: String,
    #[serde(rename = "type")]
    pub machine_type: MachineType,
    /// Air temperature (K)
    pub air_temperature: f64,
    /// Process temperature (K)
    pub process_temperature: f64,
    /// Rotational speed (rpm)
    pub rotational_speed: f64,
    /// Torque (Nm)
    pub torque: f64,
    /// Tool wear (min)
    pub tool_wear: f64,
}

impl PredictionRequest {
    /// Raw feature values in model input order, before scaling
    pub fn raw_features(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.machine_type.code()),
            self.air_temperature,
            self.process_temperature,
            self.rotational_speed,
            self.torque,
            self.tool_wear,
        ]
    }
}
