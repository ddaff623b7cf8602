//! CORS, response compression, request body limits and security headers.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::{self, HeaderValue};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

/// Tracing target for security middleware.
const TRACING_TARGET: &str = "converse_server::middleware::security";

/// Default preflight cache lifetime: 30 days.
const DEFAULT_CORS_MAX_AGE: u64 = 2_592_000;

/// Default request body limit: 4 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Layers CORS, compression, the body limit and security headers.
    fn with_security(self, config: &SecurityConfig) -> Self;

    /// Layers security middleware with default configuration.
    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, config: &SecurityConfig) -> Self {
        let cors = &config.cors;
        let cors_layer = CorsLayer::new()
            .allow_origin(cors.allow_origin())
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(cors.allows_credentials())
            .max_age(cors.max_age());

        self.layer(DefaultBodyLimit::max(config.max_body_size))
            .layer(RequestBodyLimitLayer::new(config.max_body_size))
            .layer(CompressionLayer::new())
            .layer(cors_layer)
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::REFERRER_POLICY,
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ))
    }

    fn with_default_security(self) -> Self {
        self.with_security(&SecurityConfig::default())
    }
}

/// Security middleware configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityConfig {
    #[cfg_attr(feature = "config", command(flatten))]
    pub cors: CorsConfig,

    /// Largest accepted request body in bytes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_BODY_SIZE", default_value_t = DEFAULT_MAX_BODY_SIZE)
    )]
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors: CorsConfig::default(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// Allowed origins. Empty allows any origin.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    pub allowed_origins: Vec<String>,

    /// Maximum age for CORS preflight requests in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_MAX_AGE", default_value_t = DEFAULT_CORS_MAX_AGE)
    )]
    pub max_age_seconds: u64,

    /// Whether to allow credentials in CORS requests.
    ///
    /// Ignored while every origin is allowed.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ALLOW_CREDENTIALS", default_value_t = false)
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: DEFAULT_CORS_MAX_AGE,
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    /// Returns the CORS max age as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Parses the configured origins, skipping any that are not valid header values.
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        origin = %origin,
                        "Ignoring invalid CORS origin"
                    );
                    None
                }
            })
            .collect()
    }

    /// Credentials are only allowed together with an explicit origin list.
    pub fn allows_credentials(&self) -> bool {
        self.allow_credentials && !self.allowed_origins.is_empty()
    }

    fn allow_origin(&self) -> AllowOrigin {
        if self.allowed_origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(self.to_header_values())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::{get, post};
    use axum_test::TestServer;

    use super::*;

    fn app(config: &SecurityConfig) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route("/echo", post(|body: String| async move { body }))
            .with_security(config)
    }

    #[test]
    fn invalid_origins_are_skipped() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.example.com".into(), "bad\norigin".into()],
            ..CorsConfig::default()
        };
        assert_eq!(config.to_header_values().len(), 1);
        assert_eq!(config.max_age(), Duration::from_secs(2_592_000));
    }

    #[test]
    fn credentials_need_explicit_origins() {
        let mut config = CorsConfig {
            allow_credentials: true,
            ..CorsConfig::default()
        };
        assert!(!config.allows_credentials());

        config.allowed_origins.push("https://app.example.com".into());
        assert!(config.allows_credentials());
    }

    #[tokio::test]
    async fn security_headers_are_set() -> anyhow::Result<()> {
        let server = TestServer::new(app(&SecurityConfig::default()))?;

        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_header(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        response.assert_header(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

        Ok(())
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() -> anyhow::Result<()> {
        let config = SecurityConfig {
            max_body_size: 16,
            ..SecurityConfig::default()
        };
        let server = TestServer::new(app(&config))?;

        server.post("/echo").text("short").await.assert_status_ok();
        server
            .post("/echo")
            .text("x".repeat(64))
            .await
            .assert_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE);

        Ok(())
    }
}
