//! Application state and dependency injection.

mod catalog;
mod config;
mod state;

pub use converse_core::{Error, Result};

pub use crate::service::catalog::PgDialogCatalog;
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::state::ServiceState;

/// Tracing target for service initialization.
pub const TRACING_TARGET_SERVICE: &str = "converse_server::service";
