//! Account registration and authentication.
//!
//! [`AuthService`] owns the rules; [`CredentialStore`] is the injected
//! persistence seam, implemented for [`PgClient`].
//!
//! [`PgClient`]: strona_postgres::PgClient

mod auth_service;
mod credential_store;
#[cfg(test)]
pub(crate) mod test_stores;

pub use auth_service::{AuthError, AuthOutcome, AuthService, MIN_PASSWORD_LEN};
pub use credential_store::{CredentialStore, StoreError, StoredAccount};
