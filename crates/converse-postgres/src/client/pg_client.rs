use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use deadpool::managed::{Hook, Pool};
use derive_more::{Deref, DerefMut};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};
use diesel_async::scoped_futures::ScopedBoxFuture;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::custom_hooks;
use crate::{
    ConnectionPool, PgConfig, PgError, PgResult, PooledConnection, TRACING_TARGET_CONNECTION,
};

/// Acquisitions slower than this are logged as warnings.
const SLOW_ACQUIRE: Duration = Duration::from_millis(100);

/// Snapshot of the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgPoolStatus {
    pub max_size: usize,
    pub size: usize,
    pub available: usize,
    pub waiting: usize,
}

impl PgPoolStatus {
    /// Returns the share of `max_size` currently checked out, 0.0 to 1.0.
    #[inline]
    pub fn utilization(&self) -> f64 {
        if self.max_size == 0 {
            return 0.0;
        }

        self.size.saturating_sub(self.available) as f64 / self.max_size as f64
    }

    /// Returns `true` if callers are queuing or most connections are busy.
    #[inline]
    pub fn is_under_pressure(&self) -> bool {
        self.waiting > 0 || self.utilization() > 0.8
    }
}

/// Cloneable handle to the PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgClient {
    inner: Arc<PgClientInner>,
}

struct PgClientInner {
    pool: ConnectionPool,
    config: PgConfig,
}

impl PgClient {
    /// Creates the pool. No connection is opened until one is requested.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::Unexpected`] if the pool cannot be built.
    #[tracing::instrument(
        skip(config),
        target = TRACING_TARGET_CONNECTION,
        fields(database_url = %config.database_url_masked())
    )]
    pub fn new(config: PgConfig) -> PgResult<Self> {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(custom_hooks::setup_callback);
        let manager =
            AsyncDieselConnectionManager::new_with_config(&config.postgres_url, manager_config);

        let pool = Pool::builder(manager)
            .max_size(config.postgres_max_connections as usize)
            .wait_timeout(config.connection_timeout())
            .create_timeout(config.connection_timeout())
            .recycle_timeout(config.idle_timeout())
            .runtime(deadpool::Runtime::Tokio1)
            .post_create(Hook::sync_fn(custom_hooks::post_create))
            .pre_recycle(Hook::sync_fn(custom_hooks::pre_recycle))
            .post_recycle(Hook::sync_fn(custom_hooks::post_recycle))
            .build()
            .map_err(|error| {
                tracing::error!(
                    target: TRACING_TARGET_CONNECTION,
                    error = %error,
                    "Failed to create connection pool"
                );
                PgError::Unexpected(format!("failed to build connection pool: {error}").into())
            })?;

        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            max_connections = config.postgres_max_connections,
            "Database client initialized"
        );

        Ok(Self {
            inner: Arc::new(PgClientInner { pool, config }),
        })
    }

    /// Checks out a connection, waiting up to the configured timeout.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CONNECTION)]
    pub async fn get_connection(&self) -> PgResult<PgConn> {
        let conn = self.get_pooled_connection().await?;
        Ok(PgConn::new(conn))
    }

    pub(crate) async fn get_pooled_connection(&self) -> PgResult<PooledConnection> {
        let started = Instant::now();
        let conn = self.inner.pool.get().await.map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                error = %error,
                elapsed = ?started.elapsed(),
                "Failed to acquire connection from pool"
            );
            PgError::from(error)
        })?;

        let elapsed = started.elapsed();
        if elapsed > SLOW_ACQUIRE {
            tracing::warn!(
                target: TRACING_TARGET_CONNECTION,
                elapsed = ?elapsed,
                status = ?self.pool_status(),
                "Connection acquisition took longer than expected"
            );
        }

        Ok(conn)
    }

    /// Runs `SELECT 1` on a pooled connection.
    pub async fn ping(&self) -> PgResult<Duration> {
        #[derive(diesel::QueryableByName)]
        struct Ping {
            #[diesel(sql_type = diesel::sql_types::Integer)]
            #[allow(dead_code)]
            result: i32,
        }

        let started = Instant::now();
        let mut conn = self.get_pooled_connection().await?;
        let _: Ping = diesel::sql_query("SELECT 1 AS result")
            .get_result(&mut *conn)
            .await?;

        Ok(started.elapsed())
    }

    #[inline]
    pub fn pool_status(&self) -> PgPoolStatus {
        let status = self.inner.pool.status();
        PgPoolStatus {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }

    #[inline]
    pub fn config(&self) -> &PgConfig {
        &self.inner.config
    }
}

impl fmt::Debug for PgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgClient")
            .field("config", &self.inner.config)
            .field("pool", &self.pool_status())
            .finish()
    }
}

/// A pooled connection that implements every repository trait.
///
/// Returned to the pool on drop.
///
/// ```ignore
/// let mut conn = pg_client.get_connection().await?;
/// let tenant = conn.find_tenant_by_id(tenant_id).await?;
/// ```
#[derive(Deref, DerefMut)]
pub struct PgConn {
    #[deref]
    #[deref_mut]
    conn: PooledConnection,
}

impl PgConn {
    pub fn new(conn: PooledConnection) -> Self {
        Self { conn }
    }

    /// Runs `f` inside a transaction, committing on `Ok` and rolling back on `Err`.
    pub async fn transaction<'a, T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: for<'r> FnOnce(&'r mut PooledConnection) -> ScopedBoxFuture<'a, 'r, Result<T, E>>
            + Send
            + 'a,
        T: Send + 'a,
        E: From<diesel::result::Error> + Send + 'a,
    {
        self.conn.transaction(f).await
    }
}

impl fmt::Debug for PgConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConn").finish_non_exhaustive()
    }
}
