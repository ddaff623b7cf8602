//! Connection setup and pool lifecycle hooks.

use std::time::Instant;

use deadpool::managed::{HookResult, Metrics};
use diesel::ConnectionResult;
use diesel_async::pooled_connection::{PoolError, PoolableConnection};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::{PgConfig, TRACING_TARGET_CONNECTION};

/// Establishes a new connection and logs how long it took.
///
/// Installed as the [`ManagerConfig::custom_setup`] callback.
///
/// [`ManagerConfig::custom_setup`]: diesel_async::pooled_connection::ManagerConfig
pub fn setup_callback<C>(addr: &str) -> BoxFuture<'_, ConnectionResult<C>>
where
    C: AsyncConnection + 'static,
{
    let started = Instant::now();
    let masked = PgConfig::mask_url(addr);

    async move {
        let result = C::establish(addr).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(_) => tracing::info!(
                target: TRACING_TARGET_CONNECTION,
                addr = %masked,
                elapsed_ms,
                "Database connection established"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                addr = %masked,
                elapsed_ms,
                error = %error,
                "Failed to establish database connection"
            ),
        }

        result
    }
    .boxed()
}

/// Runs once after a connection joins the pool.
pub fn post_create(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    tracing::debug!(
        target: TRACING_TARGET_CONNECTION,
        hook = "post_create",
        is_broken = conn.is_broken(),
        created_at = ?metrics.created,
        "Connection added to pool"
    );

    Ok(())
}

/// Runs before a returned connection is handed out again.
pub fn pre_recycle(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    if conn.is_broken() {
        tracing::warn!(
            target: TRACING_TARGET_CONNECTION,
            hook = "pre_recycle",
            recycle_count = metrics.recycle_count,
            "Recycling a broken connection"
        );
    }

    Ok(())
}

/// Runs after a connection was recycled.
pub fn post_recycle(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    let is_broken = conn.is_broken();

    tracing::trace!(
        target: TRACING_TARGET_CONNECTION,
        hook = "post_recycle",
        is_broken,
        last_recycled = ?metrics.recycled,
        recycle_count = metrics.recycle_count,
        "Connection recycled"
    );

    if is_broken {
        tracing::error!(
            target: TRACING_TARGET_CONNECTION,
            hook = "post_recycle",
            "Connection is still broken after recycling"
        );
    }

    Ok(())
}
