//! Response envelope and payloads
//!
//! Every response, success or failure, is an [`ApiResponse`]:
//! `{ "status_code", "message", "error", "data" }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use data_validator::PredictionRequest;
use decision_engine::{BinaryLabel, RankedClass, SuggestedOverride};
use inference_engine::{ClassProbabilities, FailureType};
use serde::Serialize;

use crate::context::{BinaryPrediction, TypePrediction};

/// Uniform response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub message: String,
    /// Empty on success
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 response carrying `data`
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            message: message.into(),
            error: String::new(),
            data: Some(data),
        }
    }

    /// Error response without data
    pub fn error(status: StatusCode, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            error: error.into(),
            data: None,
        }
    }

    /// Attach data to the envelope
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Round to 4 decimal places for presentation
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// `data` of the health endpoint
#[derive(Debug, Serialize)]
pub struct HealthData {
    pub binary_model_loaded: bool,
    pub failure_type_model_loaded: bool,
}

/// `data` of the root endpoint
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: String,
    pub endpoints: Vec<&'static str>,
}

/// `data` of the binary prediction endpoint
#[derive(Debug, Serialize)]
pub struct BinaryPredictionData {
    /// 0 (not failed) or 1 (failed)
    pub prediction: u8,
    pub prediction_label: BinaryLabel,
    pub probability: f64,
    pub confidence: f64,
    pub input_data: PredictionRequest,
}

impl From<BinaryPrediction> for BinaryPredictionData {
    fn from(prediction: BinaryPrediction) -> Self {
        let outcome = prediction.outcome;
        Self {
            prediction: outcome.label.as_int(),
            prediction_label: outcome.label,
            probability: round4(outcome.probability),
            confidence: round4(outcome.confidence),
            input_data: prediction.request,
        }
    }
}

/// `data` of the failure type endpoint
#[derive(Debug, Serialize)]
pub struct FailureTypeData {
    pub prediction: FailureType,
    pub probabilities: ClassProbabilities,
    pub confidence: f64,
    pub ambiguous: bool,
    pub top_k: Option<Vec<RankedClass>>,
    pub suggested_override: Option<SuggestedOverride>,
    pub input_data: PredictionRequest,
}

impl From<TypePrediction> for FailureTypeData {
    fn from(prediction: TypePrediction) -> Self {
        let outcome = prediction.outcome;
        Self {
            prediction: outcome.prediction,
            probabilities: outcome.probabilities.map(round4),
            confidence: round4(outcome.confidence),
            ambiguous: outcome.ambiguous,
            top_k: outcome.top_k.map(|ranked| {
                ranked
                    .into_iter()
                    .map(|r| RankedClass {
                        label: r.label,
                        prob: round4(r.prob),
                    })
                    .collect()
            }),
            suggested_override: outcome.suggested_override,
            input_data: prediction.request,
        }
    }
}
