//! Prediction context
//!
//! Everything a request needs (validator, scaler, models and decision
//! engine) built once at startup and shared read-only across handlers.

use data_validator::{MachineInput, PredictionRequest, Validator};
use decision_engine::{BinaryOutcome, DecisionEngine, MulticlassOutcome};
use feature_engine::{MinMaxScaler, NormalizedFeatureVector};
use inference_engine::{
    BinaryClassifier, ClassProbabilities, FailureTypeClassifier, InferenceError,
    OnnxBinaryClassifier, OnnxFailureTypeClassifier,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::metrics;

/// Binary prediction for a validated request
#[derive(Debug, Clone)]
pub struct BinaryPrediction {
    pub request: PredictionRequest,
    pub outcome: BinaryOutcome,
}

/// Failure type prediction for a validated request
#[derive(Debug, Clone)]
pub struct TypePrediction {
    pub request: PredictionRequest,
    pub binary: BinaryOutcome,
    pub outcome: MulticlassOutcome,
}

/// Immutable per-process prediction context
pub struct PredictionContext {
    validator: Validator,
    engine: DecisionEngine,
    scaler: Option<MinMaxScaler>,
    binary_model: Option<Arc<dyn BinaryClassifier>>,
    failure_type_model: Option<Arc<dyn FailureTypeClassifier>>,
}

impl PredictionContext {
    /// Context with no artifacts loaded
    pub fn new(validator: Validator, engine: DecisionEngine) -> Self {
        Self {
            validator,
            engine,
            scaler: None,
            binary_model: None,
            failure_type_model: None,
        }
    }

    pub fn with_scaler(mut self, scaler: MinMaxScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    pub fn with_binary_model(mut self, model: Arc<dyn BinaryClassifier>) -> Self {
        self.binary_model = Some(model);
        self
    }

    pub fn with_failure_type_model(mut self, model: Arc<dyn FailureTypeClassifier>) -> Self {
        self.failure_type_model = Some(model);
        self
    }

    /// Build the context from configuration
    ///
    /// Artifacts that are missing or fail to load are logged and left
    /// unloaded; the health endpoint reports them and predictions needing
    /// them answer 503. Invalid decision thresholds are fatal.
    pub fn load(config: &AppConfig) -> ApiResult<Self> {
        let engine = DecisionEngine::from_config(config.decision.clone(), &config.rules)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let mut context = Self::new(Validator::new(config.validation.clone()), engine);

        let paths = &config.models;
        let scaler = load_artifact("scaler", &paths.scaler_path, |p| {
            MinMaxScaler::load(p, config.scaler.clamp).map_err(|e| e.to_string())
        });
        if let Some(scaler) = scaler {
            context = context.with_scaler(scaler);
        }

        let binary = load_artifact("binary model", &paths.binary_model_path, |p| {
            OnnxBinaryClassifier::load(p).map_err(|e| e.to_string())
        });
        if let Some(model) = binary {
            context = context.with_binary_model(Arc::new(model));
        }

        let failure_type = load_artifact(
            "failure type model",
            &paths.failure_type_model_path,
            |p| OnnxFailureTypeClassifier::load(p).map_err(|e| e.to_string()),
        );
        if let Some(model) = failure_type {
            context = context.with_failure_type_model(Arc::new(model));
        }

        info!(
            "Prediction context ready: scaler={}, binary_model={}, failure_type_model={}",
            context.scaler_loaded(),
            context.binary_model_loaded(),
            context.failure_type_model_loaded()
        );
        Ok(context)
    }

    pub fn scaler_loaded(&self) -> bool {
        self.scaler.is_some()
    }

    pub fn binary_model_loaded(&self) -> bool {
        self.binary_model.is_some()
    }

    pub fn failure_type_model_loaded(&self) -> bool {
        self.failure_type_model.is_some()
    }

    /// Predict whether the machine will fail
    pub fn predict_binary(&self, input: MachineInput) -> ApiResult<BinaryPrediction> {
        let request = self.validator.validate(input)?;
        let features = self.normalize(&request)?;
        let outcome = self.binary_outcome(&features)?;

        metrics::record_prediction("binary", outcome.label.as_str());
        Ok(BinaryPrediction { request, outcome })
    }

    /// Predict the failure type, consulting the failure type model only when
    /// the binary model predicts a failure
    pub fn predict_type(&self, input: MachineInput) -> ApiResult<TypePrediction> {
        let request = self.validator.validate(input)?;
        let features = self.normalize(&request)?;
        let binary = self.binary_outcome(&features)?;

        let outcome = self.engine.decide_type(&binary, &request, || {
            self.class_probabilities(&features)
        })?;

        metrics::record_prediction("type", outcome.prediction.label());
        Ok(TypePrediction {
            request,
            binary,
            outcome,
        })
    }

    fn normalize(
        &self,
        request: &PredictionRequest,
    ) -> Result<NormalizedFeatureVector, InferenceError> {
        let scaler = self.scaler.as_ref().ok_or(InferenceError::NotLoaded("scaler"))?;
        Ok(scaler.transform(request))
    }

    fn binary_outcome(
        &self,
        features: &NormalizedFeatureVector,
    ) -> Result<BinaryOutcome, InferenceError> {
        let model = self
            .binary_model
            .as_ref()
            .ok_or(InferenceError::NotLoaded("binary model"))?;

        let start = Instant::now();
        let probability = model.failure_probability(features)?;
        metrics::record_inference("binary", start.elapsed());

        Ok(self.engine.decide_binary(probability))
    }

    fn class_probabilities(
        &self,
        features: &NormalizedFeatureVector,
    ) -> Result<ClassProbabilities, InferenceError> {
        let model = self
            .failure_type_model
            .as_ref()
            .ok_or(InferenceError::NotLoaded("failure type model"))?;

        let start = Instant::now();
        let probabilities = model.class_probabilities(features)?;
        metrics::record_inference("failure_type", start.elapsed());

        Ok(probabilities)
    }
}

fn load_artifact<T>(
    name: &str,
    path: &Path,
    load: impl FnOnce(&Path) -> Result<T, String>,
) -> Option<T> {
    if !path.exists() {
        warn!("{} not found at {}; continuing without it", name, path.display());
        return None;
    }
    match load(path) {
        Ok(artifact) => Some(artifact),
        Err(e) => {
            warn!("Could not load {} from {}: {}", name, path.display(), e);
            None
        }
    }
}
