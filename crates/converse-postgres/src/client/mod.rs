//! Pooled PostgreSQL client and schema migrations.

mod custom_hooks;
mod migrate;
mod pg_client;
mod pg_config;

use deadpool::managed::{Object, Pool};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;

pub use self::migrate::{MigrationResult, MigrationStatus, PgClientExt};
pub use self::pg_client::{PgClient, PgConn, PgPoolStatus};
pub use self::pg_config::PgConfig;

/// Connection pool shared by every [`PgClient`] clone.
pub type ConnectionPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Connection checked out of the [`ConnectionPool`].
pub type PooledConnection = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;
