//! OpenAPI document generation with the Scalar API reference.
//!
//! The document is generated from aide's [`ApiRouter`]. Routes registered with
//! plain axum routing, such as the streamed completions endpoint, are served
//! but not described.
//!
//! # Usage
//!
//! ```rust
//! use aide::axum::ApiRouter;
//! use axum::Router;
//! use converse_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//!
//! let app: Router<()> = ApiRouter::new()
//!     .with_open_api(OpenApiConfig::default());
//! ```
//!
//! [`ApiRouter`]: aide::axum::ApiRouter

use aide::axum::ApiRouter;
use aide::openapi::{Info, License, OpenApi};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Paths the OpenAPI document and the Scalar UI are served at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path which exposes the OpenAPI JSON specification.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_JSON_PATH", default_value = "/api/openapi.json")
    )]
    pub open_api_json: String,

    /// Path which exposes the Scalar API reference UI.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_SCALAR_PATH", default_value = "/api/scalar")
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: "/api/openapi.json".to_owned(),
            scalar_ui: "/api/scalar".to_owned(),
        }
    }
}

/// Extension trait for [`ApiRouter`] to serve its OpenAPI document.
///
/// [`ApiRouter`]: aide::axum::ApiRouter
pub trait RouterOpenApiExt<S> {
    /// Finishes the router, serving the document with the default [`Info`].
    ///
    /// [`Info`]: aide::openapi::Info
    fn with_open_api(self, config: OpenApiConfig) -> Router<S>;

    /// Finishes the router, serving the document with custom [`Info`].
    ///
    /// [`Info`]: aide::openapi::Info
    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: OpenApiConfig) -> Router<S> {
        let info = Info {
            title: "Converse API".to_owned(),
            summary: Some(
                "Chat assistant configuration and OpenAI-compatible completions".to_owned(),
            ),
            description: Some(
                "Manage retrieval-augmented chat assistants bound to knowledge bases and \
                 talk to them through an OpenAI-compatible chat completions endpoint."
                    .to_owned(),
            ),
            license: Some(License {
                name: "MIT".to_owned(),
                identifier: Some("MIT".to_owned()),
                ..License::default()
            }),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            ..Info::default()
        };

        self.with_open_api_info(config, info)
    }

    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S> {
        async fn serve_openapi(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
            Json(api)
        }

        let mut api = OpenApi {
            info,
            ..OpenApi::default()
        };

        let scalar = Scalar::new(&config.open_api_json);
        let router = self
            .route(&config.scalar_ui, scalar.axum_route())
            .route(&config.open_api_json, get(serve_openapi));

        router.finish_api(&mut api).layer(Extension(api))
    }
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;

    use super::*;

    #[tokio::test]
    async fn document_lists_documented_routes() -> anyhow::Result<()> {
        use aide::axum::routing::get_with;

        async fn ping() -> String {
            "pong".to_owned()
        }

        let app: Router = ApiRouter::new()
            .api_route("/api/ping", get_with(ping, |op| op.summary("Ping")))
            .with_open_api(OpenApiConfig::default());
        let server = TestServer::new(app)?;

        let response = server.get("/api/openapi.json").await;
        response.assert_status_ok();

        let document = response.json::<serde_json::Value>();
        assert_eq!(document["info"]["title"], "Converse API");
        assert!(document["paths"]["/api/ping"]["get"].is_object());

        server.get("/api/scalar").await.assert_status_ok();

        Ok(())
    }
}
