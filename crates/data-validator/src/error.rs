//! Validation Error Types

use serde::Serialize;
use thiserror::Error;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite value
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    /// Machine type outside {L, M, H}
    #[error("type must be one of L, M, H (got {0:?})")]
    InvalidMachineType(String),

    /// Body could not be decoded into a machine reading
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl ValidationError {
    /// Name of the offending request field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange { field, .. } => field,
            ValidationError::NotFinite { field } => field,
            ValidationError::InvalidMachineType(_) => "type",
            ValidationError::InvalidFormat(_) => "body",
        }
    }
}

/// Serializable form of a [`ValidationError`], used in error envelopes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        Self {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// A request rejected by the validator, carrying every failing field
#[derive(Debug, Clone, Error)]
#[error("request failed validation ({} error(s)): {}", .errors.len(), summarize(.errors))]
pub struct InvalidRequest {
    pub errors: Vec<ValidationError>,
}

impl InvalidRequest {
    /// Field-level detail for the response body
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.errors.iter().map(FieldError::from).collect()
    }
}

impl From<ValidationError> for InvalidRequest {
    fn from(err: ValidationError) -> Self {
        Self { errors: vec![err] }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
