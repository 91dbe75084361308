//! HTTP error mapping

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use data_validator::{FieldError, InvalidRequest, ValidationError};
use inference_engine::InferenceError;
use thiserror::Error;
use tracing::{error, warn};

use crate::metrics;
use crate::response::ApiResponse;

/// Error returned by request handlers
///
/// Rendered in the same envelope as successful responses, with
/// `status_code` reflecting the failure class.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed, missing or out-of-range input (422)
    #[error(transparent)]
    Validation(#[from] InvalidRequest),

    /// Model or scaler unavailable (503) or failing (500)
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// Anything else (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(ValidationError::InvalidFormat(rejection.body_text()).into())
    }
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Inference(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Inference(e) if e.is_unavailable() => "unavailable",
            ApiError::Inference(_) => "inference",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        metrics::record_error(self.kind());

        let response: ApiResponse<Vec<FieldError>> = match &self {
            ApiError::Validation(invalid) => {
                warn!(error = %invalid, "Rejected prediction request");
                ApiResponse::error(status, "Validation error", invalid.to_string())
                    .with_data(invalid.field_errors())
            }
            ApiError::Inference(e) if e.is_unavailable() => {
                warn!(error = %e, "Prediction requested while artifacts are unavailable");
                ApiResponse::error(status, "Model unavailable", e.to_string())
            }
            ApiError::Inference(e) => {
                error!(error = %e, "Inference error");
                ApiResponse::error(status, "Prediction failed", e.to_string())
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                ApiResponse::error(status, "Internal server error", "An internal error occurred")
            }
        };

        response.into_response()
    }
}
