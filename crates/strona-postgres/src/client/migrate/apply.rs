use std::time::Instant;

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;

use super::{MigrationResult, get_migration_status};
use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Applies the embedded migrations the database has not seen yet.
///
/// The diesel harness is blocking, so the work runs on the blocking pool
/// through an [`AsyncConnectionWrapper`].
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationResult> {
    let started = Instant::now();
    let mut conn = pg.get_pooled_connection().await?;

    let status = get_migration_status(&mut conn).await?;
    if status.is_up_to_date() {
        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            applied = status.applied_versions.len(),
            "schema up to date"
        );
        return Ok(MigrationResult {
            duration: started.elapsed(),
            processed_versions: Vec::new(),
        });
    }

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        pending = status.pending_versions.len(),
        first = status.next_pending_version(),
        "applying migrations"
    );

    let mut harness: AsyncConnectionWrapper<_> = conn.into();
    let processed_versions = tokio::task::spawn_blocking(move || {
        harness
            .run_pending_migrations(MIGRATIONS)
            .map(|applied| applied.iter().map(ToString::to_string).collect::<Vec<_>>())
    })
    .await
    .map_err(|join| PgError::Migration(join.into()))?
    .map_err(PgError::Migration)
    .inspect_err(|error| {
        tracing::error!(target: TRACING_TARGET_MIGRATION, %error, "migration failed");
    })?;

    let duration = started.elapsed();
    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        applied = processed_versions.len(),
        duration_ms = duration.as_millis() as u64,
        "migrations applied"
    );

    Ok(MigrationResult {
        duration,
        processed_versions,
    })
}
