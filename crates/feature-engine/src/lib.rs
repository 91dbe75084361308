//! Feature Engineering Engine
//!
//! Scales validated machine readings into the fixed-order, `[0, 1]` feature
//! vector the classifiers were trained on.

mod features;
mod scaler;

pub use features::NormalizedFeatureVector;
pub use scaler::{MinMaxScaler, ScalerArtifact};

pub use data_validator::{FEATURE_COUNT, FEATURE_NAMES};

use thiserror::Error;

/// Errors while loading or applying the scaler
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Failed to read scaler artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse scaler artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid scaler: {0}")]
    InvalidScaler(String),
}
