//! All `aide::axum::`[`ApiRouter`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use axum::Router;
//! use converse_server::handler::routes;
//! use converse_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//! use converse_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example(config: ServiceConfig) -> anyhow::Result<()> {
//! let state = ServiceState::from_config(&config).await?;
//! let app: Router = routes()
//!     .with_open_api(OpenApiConfig::default())
//!     .with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`ApiRouter`]: aide::axum::ApiRouter
//! [`Handler`]: axum::handler::Handler

mod chats;
mod completions;
mod defaults;
mod error;
mod monitors;
pub mod request;
pub mod response;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with every route and a not-found fallback.
///
/// Every route except `/api/health` authenticates with a tenant API token.
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(chats::routes())
        .merge(completions::routes())
        .merge(defaults::routes())
        .merge(monitors::routes())
        .fallback(fallback)
}
