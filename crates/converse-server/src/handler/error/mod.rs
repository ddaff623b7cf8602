//! Handler errors and their conversions from lower layers.
//!
//! Every failure renders as `{code, message, data: null}` with a status that
//! matches the failure class. See [`ErrorKind`] for the mapping.

mod core_error;
mod http_error;
mod pg_error;

pub use self::http_error::{Error, ErrorKind, Result};

/// Tracing target for rendered handler errors.
pub(crate) const TRACING_TARGET: &str = "converse_server::handler::error";
