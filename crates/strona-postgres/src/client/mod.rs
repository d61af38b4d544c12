//! Pooled [`PgClient`], its [`PgConfig`] and the startup migration runner.

pub(crate) mod custom_hooks;
pub mod migrate;
mod pg_client;
mod pg_config;

use deadpool::managed::{Object, Pool};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
pub use migrate::{
    MigrationResult, MigrationStatus, PgClientExt, get_applied_migrations, get_migration_status,
    run_pending_migrations, verify_schema_integrity,
};
pub use pg_client::{PgClient, PgConn};
pub use pg_config::PgConfig;

pub type ConnectionPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// A connection on loan from [`ConnectionPool`].
pub type PooledConnection = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;
