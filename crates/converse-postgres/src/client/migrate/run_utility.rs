use diesel::pg::Pg;
use diesel::sql_query;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel::migration::MigrationSource;

use super::MigrationStatus;
use crate::{MIGRATIONS, PgError, PgResult, TRACING_TARGET_MIGRATION};

#[derive(diesel::QueryableByName)]
struct ExistsRow {
    #[diesel(sql_type = diesel::sql_types::Bool)]
    exists: bool,
}

#[derive(diesel::QueryableByName)]
struct VersionRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    version: String,
}

/// Lists the versions of every migration compiled into the binary.
fn embedded_versions() -> PgResult<Vec<String>> {
    let migrations = MigrationSource::<Pg>::migrations(&MIGRATIONS).map_err(PgError::Migration)?;
    let mut versions: Vec<String> = migrations
        .iter()
        .map(|migration| migration.name().version().to_string())
        .collect();
    versions.sort();
    Ok(versions)
}

async fn migration_table_exists(conn: &mut AsyncPgConnection) -> PgResult<bool> {
    let row: ExistsRow = sql_query(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_name = '__diesel_schema_migrations'
         ) AS exists",
    )
    .get_result(conn)
    .await?;

    Ok(row.exists)
}

/// Compares embedded migrations with the recorded ones.
///
/// A database that was never migrated reports every migration as pending.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn get_migration_status(conn: &mut AsyncPgConnection) -> PgResult<MigrationStatus> {
    let applied_versions = if migration_table_exists(conn).await? {
        get_applied_migrations(conn).await?
    } else {
        Vec::new()
    };

    let pending_versions: Vec<String> = embedded_versions()?
        .into_iter()
        .filter(|version| !applied_versions.contains(version))
        .collect();

    let status = MigrationStatus::new(applied_versions, pending_versions);
    tracing::debug!(
        target: TRACING_TARGET_MIGRATION,
        applied = status.applied_migrations(),
        pending = status.pending_migrations(),
        "Migration status retrieved"
    );

    Ok(status)
}

#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn verify_schema_integrity(conn: &mut AsyncPgConnection) -> PgResult<()> {
    if !migration_table_exists(conn).await? {
        tracing::warn!(
            target: TRACING_TARGET_MIGRATION,
            "Migration table is missing, database is not initialized"
        );
        return Err(PgError::Migration(
            "migration table __diesel_schema_migrations does not exist".into(),
        ));
    }

    Ok(())
}

pub async fn get_applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    let versions = sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version")
        .get_results::<VersionRow>(conn)
        .await?
        .into_iter()
        .map(|row| row.version)
        .collect();

    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_migrations_are_enumerated() {
        let versions = embedded_versions().unwrap();
        assert!(!versions.is_empty());
        assert!(versions.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
