//! Service configuration
//!
//! Layered with the `config` crate: compiled defaults, then an optional TOML
//! file, then `FAILURE_PREDICTOR__SECTION__KEY` environment variables.

use config::{Config, ConfigError, Environment, File};
use data_validator::ValidationConfig;
use decision_engine::{DecisionConfig, RuleConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::rate_limit::RateLimitConfig;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "FAILURE_PREDICTOR_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config/default";

const ENV_PREFIX: &str = "FAILURE_PREDICTOR";

/// Top-level service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelPaths,
    pub scaler: ScalerConfig,
    pub decision: DecisionConfig,
    pub rules: RuleConfig,
    pub validation: ValidationConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from the file named by [`CONFIG_PATH_ENV`] (or the default path)
    /// and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from a specific file and the environment
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.decision
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        if self.rate_limit.enabled
            && (self.rate_limit.replenish_secs == 0 || self.rate_limit.burst_size == 0)
        {
            return Err(ConfigError::Message(
                "rate_limit.replenish_secs and rate_limit.burst_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// `host:port` bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    /// Binary failure detector (ONNX)
    pub binary_model_path: PathBuf,
    /// Failure type classifier (ONNX)
    pub failure_type_model_path: PathBuf,
    /// Fitted min-max scaler (JSON)
    pub scaler_path: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            binary_model_path: PathBuf::from("models/binary_model.onnx"),
            failure_type_model_path: PathBuf::from("models/failure_type_model.onnx"),
            scaler_path: PathBuf::from("models/scaler.json"),
        }
    }
}

/// Scaler behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalerConfig {
    /// Clamp scaled features to `[0, 1]`
    pub clamp: bool,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self { clamp: true }
    }
}

/// Logging output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
