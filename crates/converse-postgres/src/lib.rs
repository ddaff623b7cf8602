#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Embeds all migrations into the final binary.
pub(crate) const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!();

/// Tracing target for client-related operations.
pub const TRACING_TARGET_CLIENT: &str = "converse_postgres::client";

/// Tracing target for database query operations.
pub const TRACING_TARGET_QUERY: &str = "converse_postgres::query";

/// Tracing target for database migration operations.
pub const TRACING_TARGET_MIGRATION: &str = "converse_postgres::migrations";

/// Tracing target for connection pool operations.
pub const TRACING_TARGET_CONNECTION: &str = "converse_postgres::connection";

mod client;
pub mod error;
pub mod model;
pub mod query;
mod schema;
pub mod types;

pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::client::{
    ConnectionPool, MigrationResult, MigrationStatus, PgClient, PgClientExt, PgConfig, PgConn,
    PgPoolStatus, PooledConnection,
};
pub use crate::error::{PgError, PgResult};
