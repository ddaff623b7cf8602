//! Request extractors.
//!
//! - [`AuthState`] resolves the bearer API token to the calling tenant.
//! - [`PgPool`] checks out a database connection.
//! - [`Json`], [`ValidateJson`], [`Path`] and [`Query`] replace their axum
//!   counterparts so that every rejection renders as an envelope error.

mod auth;
mod pg_pool;
pub mod reject;

pub use self::auth::AuthState;
pub use self::pg_pool::PgPool;
pub use self::reject::{Json, Path, Query, ValidateJson};
