//! Embedded schema migrations.

mod migrate_result;
mod run_migration;
mod run_utility;

pub use self::migrate_result::{MigrationResult, MigrationStatus};
use self::run_migration::run_pending_migrations;
use self::run_utility::{get_migration_status, verify_schema_integrity};
use crate::{PgClient, PgResult};

/// Migration operations on [`PgClient`].
pub trait PgClientExt {
    /// Applies every pending migration. Safe to call on an up-to-date schema.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;

    /// Compares the embedded migrations with the ones recorded as applied.
    fn get_migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;

    /// Fails if the migration bookkeeping table is missing.
    fn verify_schema_integrity(&self) -> impl Future<Output = PgResult<()>> + Send;
}

impl PgClientExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn get_migration_status(&self) -> PgResult<MigrationStatus> {
        let mut conn = self.get_pooled_connection().await?;
        get_migration_status(&mut conn).await
    }

    async fn verify_schema_integrity(&self) -> PgResult<()> {
        let mut conn = self.get_pooled_connection().await?;
        verify_schema_integrity(&mut conn).await
    }
}
