//! Middleware configuration for the HTTP server.
//!
//! The settings themselves live in `converse-server` and are flattened here.
//!
//! # Example
//!
//! ```bash
//! converse --cors-origins "https://example.com" --request-timeout 60
//! ```

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use converse_server::middleware::{OpenApiConfig, RecoveryConfig, SecurityConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Largest accepted request timeout in seconds.
const MAX_REQUEST_TIMEOUT: u64 = 300;

/// Security, OpenAPI and recovery settings.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS and body limit configuration.
    #[clap(flatten)]
    pub security: SecurityConfig,

    /// Paths of the OpenAPI document and the Scalar UI.
    #[clap(flatten)]
    pub openapi: OpenApiConfig,

    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Rejects a zero body limit and timeouts outside 1..=300 seconds.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.security.max_body_size == 0 {
            return Err(anyhow!("Maximum body size must be greater than zero."));
        }

        let timeout = self.recovery.request_timeout;
        if timeout == 0 || timeout > MAX_REQUEST_TIMEOUT {
            return Err(anyhow!(
                "Request timeout {timeout} seconds is invalid. Must be between 1 and {MAX_REQUEST_TIMEOUT} seconds."
            ));
        }

        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        let cors = &self.security.cors;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?cors.allowed_origins,
            credentials = cors.allows_credentials(),
            max_age_secs = cors.max_age_seconds,
            max_body_size = self.security.max_body_size,
            "Security configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            openapi_path = %self.openapi.open_api_json,
            scalar_path = %self.openapi.scalar_ui,
            "OpenAPI configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            "Recovery configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MiddlewareConfig {
        MiddlewareConfig {
            security: SecurityConfig::default(),
            openapi: OpenApiConfig::default(),
            recovery: RecoveryConfig::default(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn reject_out_of_range_values() {
        let mut middleware = config();
        middleware.recovery = RecoveryConfig::with_timeout_secs(0);
        assert!(middleware.validate().is_err());

        middleware.recovery = RecoveryConfig::with_timeout_secs(301);
        assert!(middleware.validate().is_err());

        let mut middleware = config();
        middleware.security.max_body_size = 0;
        assert!(middleware.validate().is_err());
    }
}
