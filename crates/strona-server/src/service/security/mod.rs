//! Credential hashing.

mod password_hasher;

pub use password_hasher::{HasherConfig, HasherError, PasswordHasher};
