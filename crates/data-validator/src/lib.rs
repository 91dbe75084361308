//! Machine Reading Validation
//!
//! Turns raw prediction request bodies into typed, range-checked machine
//! readings. Nothing downstream of this crate sees unvalidated input.

mod error;
mod reading;
mod validator;

pub use error::{FieldError, InvalidRequest, ValidationError};
pub use reading::{MachineInput, MachineType, PredictionRequest, FEATURE_COUNT, FEATURE_NAMES};
pub use validator::{ValidationConfig, ValidationResult, Validator};
