//! Rate Limiting Middleware using GCRA Algorithm
//!
//! Per-client-IP limits through tower_governor. The Generic Cell Rate
//! Algorithm needs no background task; each key just stores its next
//! allowed arrival time.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use governor::middleware::StateInformationMiddleware;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorError;
use tracing::warn;

use crate::metrics;
use crate::response::ApiResponse;

/// Governor config keyed by peer IP, reporting quota in `X-RateLimit-*` headers
pub type PeerGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Apply the limiter at all
    pub enabled: bool,
    /// Seconds between quota replenishments
    pub replenish_secs: u64,
    /// Burst size (max requests that can be made immediately)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            replenish_secs: 1,
            burst_size: 20,
        }
    }
}

/// Build the governor config, `None` if disabled or the parameters are
/// rejected
///
/// Requires the service to be run with
/// `into_make_service_with_connect_info::<SocketAddr>()` for IP extraction.
pub fn create_governor_config(config: &RateLimitConfig) -> Option<Arc<PeerGovernorConfig>> {
    if !config.enabled {
        return None;
    }
    GovernorConfigBuilder::default()
        .per_second(config.replenish_secs)
        .burst_size(config.burst_size)
        .use_headers()
        .error_handler(governor_error_response)
        .finish()
        .map(Arc::new)
}

/// Render limiter rejections in the standard envelope, keeping the
/// `x-ratelimit-*` headers
pub fn governor_error_response(error: GovernorError) -> Response {
    let (status, message, headers) = match &error {
        GovernorError::TooManyRequests { headers, .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests",
            headers.clone(),
        ),
        GovernorError::UnableToExtractKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            None,
        ),
        GovernorError::Other { code, headers, .. } => (*code, "Request rejected", headers.clone()),
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        metrics::record_error("rate_limited");
    } else {
        warn!(error = %error, "Rate limiter rejected request");
        metrics::record_error("internal");
    }

    let mut response = ApiResponse::<()>::error(status, message, error.to_string()).into_response();
    if let Some(headers) = headers {
        response.headers_mut().extend(headers);
    }
    response
}
