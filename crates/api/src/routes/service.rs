//! Service-level routes

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::response::{ApiResponse, ServiceInfo};
use crate::AppState;

/// Service banner with the available endpoints
pub async fn root(State(state): State<Arc<AppState>>) -> ApiResponse<ServiceInfo> {
    ApiResponse::ok(
        "Machine failure prediction API",
        ServiceInfo {
            service: "failure-predictor",
            version: state.version.clone(),
            endpoints: vec![
                "GET /api/v1/failure/health",
                "POST /api/v1/failure/predict/binary",
                "POST /api/v1/failure/predict/type",
                "GET /metrics",
            ],
        },
    )
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => ApiResponse::<()>::error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Metrics unavailable",
            "metrics recorder is not installed",
        )
        .into_response(),
    }
}
