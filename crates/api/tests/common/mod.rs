#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use api::config::AppConfig;
use api::{build_app, serve, AppState, PredictionContext};
use data_validator::Validator;
use decision_engine::{DecisionConfig, DecisionEngine, RuleConfig};
use feature_engine::MinMaxScaler;
use inference_engine::mock::{FixedBinaryClassifier, FixedFailureTypeClassifier};
use inference_engine::ClassProbabilities;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Scaler artifact matching the training data ranges.
pub const SCALER_JSON: &str = r#"{
    "feature_names": [
        "type", "air_temperature", "process_temperature",
        "rotational_speed", "torque", "tool_wear"
    ],
    "data_min": [0.0, 295.3, 305.7, 1168.0, 3.8, 0.0],
    "data_max": [2.0, 304.5, 313.8, 2886.0, 76.6, 253.0]
}"#;

/// A running server plus handles on the mock models it serves.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub binary: Arc<FixedBinaryClassifier>,
    pub multi: Arc<FixedFailureTypeClassifier>,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn post(&self, path: &str, body: &Value) -> (reqwest::StatusCode, Value) {
        let response = self.client.post(self.url(path)).json(body).send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    pub async fn get(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}

fn engine() -> DecisionEngine {
    DecisionEngine::from_config(DecisionConfig::default(), &RuleConfig::default()).unwrap()
}

async fn spawn(
    context: PredictionContext,
    config: &AppConfig,
    dir: TempDir,
) -> (String, TempDir) {
    let state = Arc::new(AppState::new(context, None));
    let app = build_app(state, config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), dir)
}

/// Start a server with a scaler loaded from disk and mock models returning
/// `probability` and `distribution`.
pub async fn start(probability: f64, distribution: [f64; 6]) -> TestServer {
    start_with_config(probability, distribution, &AppConfig::default()).await
}

/// Same as [`start`], with the middleware configured from `config`.
pub async fn start_with_config(
    probability: f64,
    distribution: [f64; 6],
    config: &AppConfig,
) -> TestServer {
    let dir = TempDir::new().unwrap();
    let scaler_path = dir.path().join("scaler.json");
    std::fs::write(&scaler_path, SCALER_JSON).unwrap();

    let binary = Arc::new(FixedBinaryClassifier::new(probability));
    let multi = Arc::new(FixedFailureTypeClassifier::new(
        ClassProbabilities::new(distribution).unwrap(),
    ));
    let context = PredictionContext::new(Validator::default(), engine())
        .with_scaler(MinMaxScaler::load(&scaler_path, true).unwrap())
        .with_binary_model(binary.clone())
        .with_failure_type_model(multi.clone());

    let (base_url, dir) = spawn(context, config, dir).await;
    TestServer {
        base_url,
        client: reqwest::Client::new(),
        binary,
        multi,
        _dir: dir,
    }
}

/// Start a server whose artifacts are all missing.
pub async fn start_unloaded() -> (String, reqwest::Client) {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.models.scaler_path = dir.path().join("scaler.json");
    config.models.binary_model_path = dir.path().join("binary_model.onnx");
    config.models.failure_type_model_path = dir.path().join("failure_type_model.onnx");

    let context = PredictionContext::load(&config).unwrap();
    let (base_url, _dir) = spawn(context, &config, dir).await;
    (base_url, reqwest::Client::new())
}

pub fn reading(machine_type: &str, tool_wear: f64) -> Value {
    json!({
        "product_id": "L47257",
        "type": machine_type,
        "air_temperature": 298.8,
        "process_temperature": 308.9,
        "rotational_speed": 1455.0,
        "torque": 41.3,
        "tool_wear": tool_wear
    })
}
