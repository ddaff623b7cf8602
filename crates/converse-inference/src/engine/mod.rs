//! HTTP client for a retrieval-augmented inference engine.
//!
//! The engine receives the stored dialog and the question as JSON and
//! answers with newline-delimited JSON, one `{"delta": "..."}` object per
//! line. A line of the form `{"error": "..."}` aborts the answer.
//!
//! ```rust,ignore
//! use converse_inference::engine::{EngineClient, EngineConfig};
//!
//! let config = EngineConfig::new("http://localhost:9380".parse()?);
//! let service = EngineClient::new(config)?.into_service();
//! ```

mod client;
mod config;
mod error;

pub use client::EngineClient;
pub use config::{DEFAULT_ENGINE_TIMEOUT_SECS, ENGINE_CONNECT_TIMEOUT_SECS, EngineConfig};
pub use error::{Error, Result};

/// Tracing target for engine client operations.
pub const TRACING_TARGET: &str = "converse_inference::engine";
