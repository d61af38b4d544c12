//! Database query repositories.
//!
//! Repository traits are implemented on [`PgConnection`] and reached through
//! a pooled [`PgConn`].
//!
//! [`PgConnection`]: crate::PgConnection
//! [`PgConn`]: crate::PgConn

pub mod account;

pub use account::AccountRepository;
