//! Prometheus metrics

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Count a served prediction
pub fn record_prediction(endpoint: &'static str, outcome: &'static str) {
    counter!("predictions_total", "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

/// Count a failed request by error class
pub fn record_error(kind: &'static str) {
    counter!("prediction_errors_total", "kind" => kind).increment(1);
}

/// Record one model forward pass
pub fn record_inference(model: &'static str, elapsed: Duration) {
    histogram!("inference_duration_seconds", "model" => model).record(elapsed.as_secs_f64());
}
