use diesel::migration::MigrationSource;
use diesel::pg::Pg;
use diesel::sql_query;
use diesel::sql_types::{Bool, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::MigrationStatus;
use crate::{MIGRATIONS, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Bookkeeping table maintained by the diesel migration harness.
const BOOKKEEPING_TABLE: &str = "__diesel_schema_migrations";

/// Tables the service cannot run without.
const REQUIRED_TABLES: [&str; 2] = [BOOKKEEPING_TABLE, "users"];

fn migration_error(context: &str, error: impl std::fmt::Display) -> PgError {
    PgError::Migration(format!("{context}: {error}").into())
}

/// Embedded migration versions, oldest first.
pub(crate) fn embedded_versions() -> PgResult<Vec<String>> {
    let mut versions: Vec<String> = MigrationSource::<Pg>::migrations(&MIGRATIONS)
        .map_err(PgError::Migration)?
        .iter()
        .map(|migration| migration.name().version().to_string())
        .collect();
    versions.sort_unstable();
    Ok(versions)
}

pub async fn get_migration_status(conn: &mut AsyncPgConnection) -> PgResult<MigrationStatus> {
    let status = MigrationStatus::compare(get_applied_migrations(conn).await?, embedded_versions()?);

    tracing::debug!(
        target: TRACING_TARGET_MIGRATION,
        applied = status.applied_versions.len(),
        pending = status.pending_versions.len(),
        "migration status read"
    );
    Ok(status)
}

/// Versions recorded by the harness; empty on a database that was never
/// migrated.
pub async fn get_applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    #[derive(diesel::QueryableByName)]
    struct Row {
        #[diesel(sql_type = Text)]
        version: String,
    }

    if !table_exists(conn, BOOKKEEPING_TABLE).await? {
        return Ok(Vec::new());
    }

    let rows: Vec<Row> = sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version")
        .load(conn)
        .await
        .map_err(|e| migration_error("cannot read applied migrations", e))?;
    Ok(rows.into_iter().map(|row| row.version).collect())
}

pub async fn verify_schema_integrity(conn: &mut AsyncPgConnection) -> PgResult<()> {
    for table in REQUIRED_TABLES {
        if !table_exists(conn, table).await? {
            tracing::error!(target: TRACING_TARGET_MIGRATION, table, "required table missing");
            return Err(PgError::Migration(
                format!("table `{table}` is missing; were migrations applied?").into(),
            ));
        }
    }

    tracing::debug!(target: TRACING_TARGET_MIGRATION, "schema check passed");
    Ok(())
}

async fn table_exists(conn: &mut AsyncPgConnection, table: &str) -> PgResult<bool> {
    #[derive(diesel::QueryableByName)]
    struct Row {
        #[diesel(sql_type = Bool)]
        present: bool,
    }

    let row: Row = sql_query(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = $1) AS present",
    )
    .bind::<Text, _>(table)
    .get_result(conn)
    .await
    .map_err(|e| migration_error(&format!("cannot look up table `{table}`"), e))?;
    Ok(row.present)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_migration_is_embedded() -> anyhow::Result<()> {
        let versions = embedded_versions()?;
        assert_eq!(versions, ["20250101000000"]);
        Ok(())
    }
}
