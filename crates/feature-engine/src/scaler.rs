//! Fitted Min-Max Scaler

use crate::features::NormalizedFeatureVector;
use crate::{FeatureError, FEATURE_COUNT, FEATURE_NAMES};
use data_validator::PredictionRequest;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// On-disk form of the fitted scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    /// Feature names in fitted order
    #[serde(default)]
    pub feature_names: Vec<String>,
    /// Per-feature minimum seen during fitting
    pub data_min: Vec<f64>,
    /// Per-feature maximum seen during fitting
    pub data_max: Vec<f64>,
}

/// Min-max transform with parameters frozen at load time
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    data_min: [f64; FEATURE_COUNT],
    data_max: [f64; FEATURE_COUNT],
    /// Clamp scaled values to `[0, 1]`
    clamp: bool,
}

impl MinMaxScaler {
    /// Build a scaler from fitted bounds
    pub fn new(
        data_min: [f64; FEATURE_COUNT],
        data_max: [f64; FEATURE_COUNT],
        clamp: bool,
    ) -> Result<Self, FeatureError> {
        for (i, (min, max)) in data_min.iter().zip(data_max.iter()).enumerate() {
            if !min.is_finite() || !max.is_finite() {
                return Err(FeatureError::InvalidScaler(format!(
                    "{} bounds must be finite",
                    FEATURE_NAMES[i]
                )));
            }
            if max < min {
                return Err(FeatureError::InvalidScaler(format!(
                    "{} max {} is below min {}",
                    FEATURE_NAMES[i], max, min
                )));
            }
        }

        Ok(Self {
            data_min,
            data_max,
            clamp,
        })
    }

    /// Build a scaler from a parsed artifact
    pub fn from_artifact(artifact: ScalerArtifact, clamp: bool) -> Result<Self, FeatureError> {
        if !artifact.feature_names.is_empty() && artifact.feature_names != FEATURE_NAMES {
            return Err(FeatureError::InvalidScaler(format!(
                "feature order {:?} does not match {:?}",
                artifact.feature_names, FEATURE_NAMES
            )));
        }

        let data_min = to_array("data_min", &artifact.data_min)?;
        let data_max = to_array("data_max", &artifact.data_max)?;
        Self::new(data_min, data_max, clamp)
    }

    /// Load the scaler artifact from a JSON file
    pub fn load(path: impl AsRef<Path>, clamp: bool) -> Result<Self, FeatureError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| FeatureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: ScalerArtifact = serde_json::from_str(&raw)?;
        let scaler = Self::from_artifact(artifact, clamp)?;

        info!("Scaler loaded from {} (clamp={})", path.display(), clamp);
        Ok(scaler)
    }

    /// Scale a validated request into the model input vector
    pub fn transform(&self, request: &PredictionRequest) -> NormalizedFeatureVector {
        let raw = request.raw_features();
        let mut values = [0.0; FEATURE_COUNT];

        for (i, value) in values.iter_mut().enumerate() {
            let mut range = self.data_max[i] - self.data_min[i];
            if range == 0.0 {
                // Constant feature during fitting
                range = 1.0;
            }
            let scaled = (raw[i] - self.data_min[i]) / range;
            *value = if self.clamp {
                scaled.clamp(0.0, 1.0)
            } else {
                scaled
            };
        }

        debug!("Scaled features for {}: {:?}", request.product_id, values);
        NormalizedFeatureVector::from_values(values)
    }

    /// Whether out-of-range values are clamped
    pub fn clamps(&self) -> bool {
        self.clamp
    }
}

fn to_array(name: &str, values: &[f64]) -> Result<[f64; FEATURE_COUNT], FeatureError> {
    values.try_into().map_err(|_| {
        FeatureError::InvalidScaler(format!(
            "{} has {} entries, expected {}",
            name,
            values.len(),
            FEATURE_COUNT
        ))
    })
}
