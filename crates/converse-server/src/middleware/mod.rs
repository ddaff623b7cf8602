//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Recovery: panics and timeouts rendered as failure envelopes
//! - Observability: request IDs and tracing spans
//! - Security: CORS, security headers, compression and body limits
//! - OpenAPI documentation with the Scalar UI
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::Router;
//! use converse_server::middleware::{
//!     RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_default_security()
//!     .with_observability()
//!     .with_default_recovery();
//! ```

mod observability;
mod recovery;
mod security;
mod specification;

pub use observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{CorsConfig, DEFAULT_MAX_BODY_SIZE, RouterSecurityExt, SecurityConfig};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
