//! Database models for all entities in the system.

mod account;

pub use account::{Account, NewAccount};
