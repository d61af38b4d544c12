#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Migrations from `./migrations`, compiled into the binary.
pub(crate) const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("./migrations");

/// Pool construction and client lifecycle.
pub const TRACING_TARGET_CLIENT: &str = "strona_postgres::client";

/// Account queries.
pub const TRACING_TARGET_QUERY: &str = "strona_postgres::queries";

/// Schema migrations and schema checks.
pub const TRACING_TARGET_MIGRATION: &str = "strona_postgres::migrations";

/// Physical connections and pool hooks.
pub const TRACING_TARGET_CONNECTION: &str = "strona_postgres::connection";

mod client;
pub mod error;
pub mod model;
pub mod query;
mod schema;
pub mod types;

pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::client::{
    ConnectionPool, MigrationResult, MigrationStatus, PgClient, PgClientExt, PgConfig, PgConn,
    PooledConnection, get_applied_migrations, get_migration_status,
    run_pending_migrations, verify_schema_integrity,
};
pub use crate::error::{PgError, PgResult};
