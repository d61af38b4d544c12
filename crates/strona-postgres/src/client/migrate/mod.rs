//! Embedded schema migrations.

mod apply;
mod status;

use std::time::Duration;

pub use apply::run_pending_migrations;
pub use status::{get_applied_migrations, get_migration_status, verify_schema_integrity};

use crate::{PgClient, PgResult};

/// Which embedded migrations the database has seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Oldest first.
    pub applied_versions: Vec<String>,
    /// Embedded but not yet applied, oldest first.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    /// Splits `embedded` into applied and pending against what the database
    /// reports as `applied`.
    pub fn compare(applied: Vec<String>, embedded: Vec<String>) -> Self {
        let pending_versions = embedded
            .into_iter()
            .filter(|version| !applied.contains(version))
            .collect();
        Self {
            applied_versions: applied,
            pending_versions,
        }
    }

    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }

    pub fn next_pending_version(&self) -> Option<&str> {
        self.pending_versions.first().map(String::as_str)
    }
}

/// What a call to [`run_pending_migrations`] applied, and how long it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    pub duration: Duration,
    pub processed_versions: Vec<String>,
}

/// Migration entry points on [`PgClient`].
///
/// The futures borrow a pooled connection and are not `Send`.
#[allow(async_fn_in_trait)]
pub trait PgClientExt {
    /// Applies every pending embedded migration. A no-op on an up-to-date
    /// schema.
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult>;

    async fn get_migration_status(&self) -> PgResult<MigrationStatus>;

    /// Fails unless both the migration bookkeeping table and `users` exist.
    async fn verify_schema_integrity(&self) -> PgResult<()>;
}

impl PgClientExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn get_migration_status(&self) -> PgResult<MigrationStatus> {
        let mut conn = self.get_connection().await?;
        get_migration_status(&mut conn).await
    }

    async fn verify_schema_integrity(&self) -> PgResult<()> {
        let mut conn = self.get_connection().await?;
        verify_schema_integrity(&mut conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn pending_versions_exclude_applied_ones() {
        let status = MigrationStatus::compare(
            versions(&["20250101000000"]),
            versions(&["20250101000000", "20250201000000"]),
        );

        assert!(!status.is_up_to_date());
        assert_eq!(status.next_pending_version(), Some("20250201000000"));
    }

    #[test]
    fn fresh_database_has_everything_pending() {
        let status = MigrationStatus::compare(Vec::new(), versions(&["20250101000000"]));
        assert!(status.applied_versions.is_empty());
        assert_eq!(status.pending_versions, versions(&["20250101000000"]));
    }

    #[tokio::test]
    async fn status_checks_need_a_connection() -> anyhow::Result<()> {
        let client = crate::PgConfig::new("postgresql://strona@127.0.0.1:1/strona")
            .with_connection_timeout_secs(1)
            .build()?;

        assert!(client.get_migration_status().await.is_err());
        assert!(client.verify_schema_integrity().await.is_err());
        Ok(())
    }

    #[test]
    fn nothing_embedded_is_up_to_date() {
        assert!(MigrationStatus::default().is_up_to_date());
        assert_eq!(MigrationStatus::default().next_pending_version(), None);
    }
}
