//! Machine Failure Prediction API Server
//!
//! REST API serving the binary failure detector and the failure type
//! classifier.

use axum::http::Method;
use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod rate_limit;
pub mod response;
mod routes;

pub use self::config::AppConfig;
pub use context::PredictionContext;
pub use error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    /// Loaded artifacts and decision logic
    pub context: PredictionContext,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(context: PredictionContext, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            context,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics,
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::service::root))
        .route("/metrics", get(routes::service::metrics))
        .nest("/api/v1/failure", routes::failure::router())
        .with_state(state)
}

/// Router with tracing, CORS and (when enabled) rate limiting
pub fn build_app(state: Arc<AppState>, config: &AppConfig) -> Router {
    let mut app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        );

    if config.rate_limit.enabled {
        match rate_limit::create_governor_config(&config.rate_limit) {
            Some(governor) => {
                info!(
                    "Rate limiting enabled: burst={}, replenish every {}s",
                    config.rate_limit.burst_size, config.rate_limit.replenish_secs
                );
                app = app.layer(GovernorLayer { config: governor });
            }
            None => warn!("Rate limit settings rejected; serving without rate limiting"),
        }
    }

    app
}

/// Initialize logging
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(
    config: &config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

/// Serve `app` on an already-bound listener until Ctrl-C
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the server
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let context = PredictionContext::load(&config)?;

    let metrics = match metrics::install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            None
        }
    };

    let state = Arc::new(AppState::new(context, metrics));
    let app = build_app(state, &config);

    let addr = config.server.bind_addr();
    info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use data_validator::Validator;
    use decision_engine::{DecisionConfig, DecisionEngine, RuleConfig};
    use feature_engine::MinMaxScaler;
    use inference_engine::mock::{FixedBinaryClassifier, FixedFailureTypeClassifier};
    use inference_engine::ClassProbabilities;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const MIN: [f64; 6] = [0.0, 295.3, 305.7, 1168.0, 3.8, 0.0];
    const MAX: [f64; 6] = [2.0, 304.5, 313.8, 2886.0, 76.6, 253.0];

    struct Harness {
        app: Router,
        binary: Arc<FixedBinaryClassifier>,
        multi: Arc<FixedFailureTypeClassifier>,
    }

    fn harness(probability: f64) -> Harness {
        let binary = Arc::new(FixedBinaryClassifier::new(probability));
        let multi = Arc::new(FixedFailureTypeClassifier::new(
            ClassProbabilities::new([0.1, 0.05, 0.15, 0.6, 0.05, 0.05]).unwrap(),
        ));
        let engine =
            DecisionEngine::from_config(DecisionConfig::default(), &RuleConfig::default()).unwrap();
        let context = PredictionContext::new(Validator::default(), engine)
            .with_scaler(MinMaxScaler::new(MIN, MAX, true).unwrap())
            .with_binary_model(binary.clone())
            .with_failure_type_model(multi.clone());

        Harness {
            app: create_router(Arc::new(AppState::new(context, None))),
            binary,
            multi,
        }
    }

    fn scenario_body() -> Value {
        json!({
            "product_id": "L47257",
            "type": "L",
            "air_temperature": 298.8,
            "process_temperature": 308.9,
            "rotational_speed": 1455.0,
            "torque": 41.3,
            "tool_wear": 208.0
        })
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(0.5);
        let (status, body) = send(h.app, Method::GET, "/api/v1/failure/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status_code"], 200);
        assert_eq!(body["data"]["binary_model_loaded"], true);
        assert_eq!(body["data"]["failure_type_model_loaded"], true);
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let h = harness(0.5);
        let (status, body) = send(h.app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["service"], "failure-predictor");
        assert!(body["data"]["endpoints"].as_array().unwrap().len() >= 3);
    }

    #[tokio::test]
    async fn test_predict_binary() {
        let h = harness(0.123456);
        let (status, body) = send(
            h.app,
            Method::POST,
            "/api/v1/failure/predict/binary",
            Some(scenario_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["prediction"], 1);
        assert_eq!(data["prediction_label"], "failed");
        assert_eq!(data["probability"], 0.1235);
        assert_eq!(data["confidence"], 0.1235);
        assert_eq!(data["input_data"]["type"], "L");
        assert_eq!(data["input_data"]["product_id"], "L47257");
        assert_eq!(h.binary.calls(), 1);
    }

    #[tokio::test]
    async fn test_predict_type_failure() {
        let h = harness(0.7);
        let (status, body) = send(
            h.app,
            Method::POST,
            "/api/v1/failure/predict/type",
            Some(scenario_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Failure type prediction successful");

        let data = &body["data"];
        assert_eq!(data["prediction"], "Power Failure");
        assert_eq!(data["confidence"], 0.6);
        assert_eq!(data["ambiguous"], false);

        let total: f64 = data["probabilities"]
            .as_object()
            .unwrap()
            .values()
            .map(|v| v.as_f64().unwrap())
            .sum();
        assert!((total - 1.0).abs() < 1e-3);

        let top_k = data["top_k"].as_array().unwrap();
        assert_eq!(top_k.len(), 3);
        assert_eq!(top_k[0]["label"], "Power Failure");
        assert_eq!(top_k[1]["label"], "Overstrain Failure");

        assert_eq!(data["suggested_override"]["label"], "Tool Wear Failure");
        assert_eq!(
            data["suggested_override"]["reason"],
            "tool_wear >= 200 (raw value: 208)"
        );
        assert_eq!(h.multi.calls(), 1);
    }

    #[tokio::test]
    async fn test_predict_type_short_circuit() {
        let h = harness(0.01);
        let (status, body) = send(
            h.app,
            Method::POST,
            "/api/v1/failure/predict/type",
            Some(scenario_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["message"],
            "Binary predicted not failed; multiclass prediction not performed"
        );
        let data = &body["data"];
        assert_eq!(data["prediction"], "No Failure");
        assert_eq!(data["ambiguous"], false);
        assert_eq!(data["confidence"], 1.0);
        assert_eq!(data["probabilities"]["No Failure"], 1.0);
        assert!(data["top_k"].is_null());
        assert!(data["suggested_override"].is_null());
        assert_eq!(h.multi.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_type_is_422() {
        let h = harness(0.9);
        let mut body = scenario_body();
        body["type"] = json!("X");

        let (status, body) = send(
            h.app,
            Method::POST,
            "/api/v1/failure/predict/type",
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status_code"], 422);
        assert_eq!(body["data"][0]["field"], "type");
        assert_eq!(h.binary.calls(), 0);
        assert_eq!(h.multi.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_fields_is_422() {
        let h = harness(0.9);
        let (status, body) = send(
            h.app,
            Method::POST,
            "/api/v1/failure/predict/binary",
            Some(json!({"product_id": "M14860", "type": "M"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["data"][0]["field"], "body");
        assert_eq!(h.binary.calls(), 0);
    }

    #[tokio::test]
    async fn test_negative_reading_is_422() {
        let h = harness(0.9);
        let mut body = scenario_body();
        body["torque"] = json!(-3.0);

        let (status, body) = send(
            h.app,
            Method::POST,
            "/api/v1/failure/predict/binary",
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["data"][0]["field"], "torque");
    }

    #[tokio::test]
    async fn test_unloaded_models_are_503() {
        let engine =
            DecisionEngine::from_config(DecisionConfig::default(), &RuleConfig::default()).unwrap();
        let context = PredictionContext::new(Validator::default(), engine);
        let app = create_router(Arc::new(AppState::new(context, None)));

        let (status, body) = send(
            app.clone(),
            Method::GET,
            "/api/v1/failure/health",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["binary_model_loaded"], false);

        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/failure/predict/binary",
            Some(scenario_body()),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status_code"], 503);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let h = harness(0.5);
        let (status, body) = send(h.app, Method::GET, "/metrics", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "Metrics unavailable");
    }
}
