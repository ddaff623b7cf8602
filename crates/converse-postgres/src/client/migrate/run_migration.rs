use std::time::Instant;

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use super::MigrationResult;
use super::run_utility::get_migration_status;
use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Applies all pending embedded migrations on a dedicated pooled connection.
///
/// The synchronous migration harness runs on the blocking thread pool.
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationResult> {
    let started = Instant::now();
    let mut conn = pg.get_pooled_connection().await?;
    let status = get_migration_status(&mut conn).await?;

    if status.is_up_to_date() {
        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            applied = status.applied_migrations(),
            "Database schema is up to date"
        );
        return Ok(MigrationResult::success(started.elapsed(), Vec::new()));
    }

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        pending = status.pending_migrations(),
        next = status.next_pending_version(),
        "Applying pending migrations"
    );

    let mut conn: AsyncConnectionWrapper<_> = conn.into();
    let applied = spawn_blocking(move || {
        conn.run_pending_migrations(MIGRATIONS).map(|versions| {
            versions
                .into_iter()
                .map(|version| version.to_string())
                .collect::<Vec<_>>()
        })
    })
    .await
    .map_err(|error| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            error = %error,
            "Migration task panicked"
        );
        PgError::Migration(error.into())
    })?;

    let duration = started.elapsed();
    let versions = applied.map_err(|error| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?duration,
            error = %error,
            "Database migration failed"
        );
        PgError::Migration(error)
    })?;

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        duration = ?duration,
        migrations_count = versions.len(),
        "Database migration completed"
    );

    Ok(MigrationResult::success(duration, versions))
}
