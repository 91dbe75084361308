//! Failure Prediction Routes

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use data_validator::MachineInput;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::response::{ApiResponse, BinaryPredictionData, FailureTypeData, HealthData};
use crate::AppState;

/// Routes mounted under `/api/v1/failure`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/predict/binary", post(predict_binary))
        .route("/predict/type", post(predict_type))
}

/// Report which models are loaded
pub async fn health(State(state): State<Arc<AppState>>) -> ApiResponse<HealthData> {
    ApiResponse::ok(
        "Service is healthy",
        HealthData {
            binary_model_loaded: state.context.binary_model_loaded(),
            failure_type_model_loaded: state.context.failure_type_model_loaded(),
        },
    )
}

/// Predict whether the machine will fail (0: not failed, 1: failed)
pub async fn predict_binary(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MachineInput>, JsonRejection>,
) -> ApiResult<ApiResponse<BinaryPredictionData>> {
    let Json(input) = payload?;
    let prediction = state.context.predict_binary(input)?;

    Ok(ApiResponse::ok(
        "Binary prediction successful",
        BinaryPredictionData::from(prediction),
    ))
}

/// Predict the failure type
pub async fn predict_type(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MachineInput>, JsonRejection>,
) -> ApiResult<ApiResponse<FailureTypeData>> {
    let Json(input) = payload?;
    let prediction = state.context.predict_type(input)?;

    let message = if prediction.outcome.short_circuited {
        "Binary predicted not failed; multiclass prediction not performed"
    } else {
        "Failure type prediction successful"
    };
    Ok(ApiResponse::ok(message, FailureTypeData::from(prediction)))
}
