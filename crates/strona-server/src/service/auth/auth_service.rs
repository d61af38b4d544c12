//! Registration and authentication.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use validator::{Validate, ValidationError, ValidationErrors};

use super::{CredentialStore, StoreError};
use crate::BoxedError;
use crate::service::PasswordHasher;

/// Tracing target for authentication operations.
const TRACING_TARGET_AUTH: &str = "strona_server::service::auth";

/// Minimum password length, counted in Unicode scalar values rather than
/// bytes or UTF-16 units.
pub const MIN_PASSWORD_LEN: u64 = 8;

/// Successful result of an authentication operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A new account was stored.
    Created {
        /// Name of the new account.
        name: String,
    },
    /// The credentials matched a stored account.
    Authenticated {
        /// Name of the authenticated account.
        name: String,
    },
}

impl AuthOutcome {
    /// Returns the account name the outcome refers to.
    pub fn name(&self) -> &str {
        match self {
            Self::Created { name } | Self::Authenticated { name } => name,
        }
    }
}

/// Failed result of an authentication operation.
///
/// [`InvalidCredentials`] is returned both for an unknown name and for a
/// wrong password; callers cannot tell the two apart.
///
/// [`InvalidCredentials`]: AuthError::InvalidCredentials
#[derive(Debug, thiserror::Error, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum AuthError {
    /// The name or the password does not satisfy the input rules.
    #[error("invalid input: {0}")]
    InvalidInput(ValidationErrors),

    /// An account with this name already exists.
    #[error("account already exists")]
    AccountExists,

    /// No account matches this name and password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The store or the hasher failed.
    #[error("internal failure: {0}")]
    InternalFailure(#[source] BoxedError),
}

impl AuthError {
    /// Returns the snake case name of the variant, for logging.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    fn internal(operation: &'static str, error: impl Into<BoxedError>) -> Self {
        let error = error.into();
        tracing::error!(
            target: TRACING_TARGET_AUTH,
            operation = operation,
            error = %error,
            "authentication backend failure"
        );
        Self::InternalFailure(error)
    }
}

#[derive(Validate)]
struct Registration {
    #[validate(length(min = 1), custom(function = "storable_name"))]
    name: String,
    #[validate(length(min = MIN_PASSWORD_LEN))]
    password: String,
}

/// Postgres text columns cannot hold NUL.
fn storable_name(name: &str) -> Result<(), ValidationError> {
    if name.contains('\0') {
        return Err(ValidationError::new("nul_byte"));
    }
    Ok(())
}

#[derive(Validate)]
struct Login {
    #[validate(length(min = 1))]
    name: String,
    #[validate(length(min = 1))]
    password: String,
}

/// Registers and authenticates accounts.
///
/// Composes an injected [`CredentialStore`] with the [`PasswordHasher`].
/// Every store call is bounded by `store_timeout`; an elapsed call counts as
/// an [`AuthError::InternalFailure`].
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    password_hasher: PasswordHasher,
    store_timeout: Duration,
}

impl AuthService {
    /// Creates a new authentication service.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        password_hasher: PasswordHasher,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            password_hasher,
            store_timeout,
        }
    }

    /// Returns the timeout applied to each store call.
    #[inline]
    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }

    /// Creates an account.
    ///
    /// The name must be non-empty and the password at least
    /// [`MIN_PASSWORD_LEN`] characters long. A name taken before or during the
    /// call yields [`AuthError::AccountExists`].
    #[tracing::instrument(skip_all, target = TRACING_TARGET_AUTH)]
    pub async fn register(&self, name: String, password: String) -> Result<AuthOutcome, AuthError> {
        let registration = Registration { name, password };
        if let Err(errors) = registration.validate() {
            tracing::debug!(
                target: TRACING_TARGET_AUTH,
                error = %errors,
                "registration rejected"
            );
            return Err(AuthError::InvalidInput(errors));
        }

        let Registration { name, password } = registration;

        if self
            .store_call("find_by_name", self.store.find_by_name(&name))
            .await?
            .is_some()
        {
            tracing::debug!(
                target: TRACING_TARGET_AUTH,
                account_name = %name,
                "registration rejected: name taken"
            );
            return Err(AuthError::AccountExists);
        }

        let password_hash = self
            .password_hasher
            .hash(password)
            .await
            .map_err(|e| AuthError::internal("hash_password", e))?;

        self.store_call("insert", self.store.insert(&name, &password_hash))
            .await
            .inspect_err(|error| {
                if matches!(error, AuthError::AccountExists) {
                    tracing::debug!(
                        target: TRACING_TARGET_AUTH,
                        account_name = %name,
                        "registration lost a race for the name"
                    );
                }
            })?;

        tracing::info!(
            target: TRACING_TARGET_AUTH,
            account_name = %name,
            "account registered"
        );

        Ok(AuthOutcome::Created { name })
    }

    /// Checks a name and password against the stored digest.
    ///
    /// Both fields must be non-empty. An unknown name still pays for one
    /// password verification before [`AuthError::InvalidCredentials`] is
    /// returned.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_AUTH)]
    pub async fn authenticate(
        &self,
        name: String,
        password: String,
    ) -> Result<AuthOutcome, AuthError> {
        let login = Login { name, password };
        if let Err(errors) = login.validate() {
            tracing::debug!(
                target: TRACING_TARGET_AUTH,
                error = %errors,
                "login rejected"
            );
            return Err(AuthError::InvalidInput(errors));
        }

        let Login { name, password } = login;

        let account = self
            .store_call("find_by_name", self.store.find_by_name(&name))
            .await?;

        let Some(account) = account else {
            self.password_hasher
                .verify_dummy(password)
                .await
                .map_err(|e| AuthError::internal("verify_password", e))?;

            tracing::debug!(
                target: TRACING_TARGET_AUTH,
                "login rejected: invalid credentials"
            );
            return Err(AuthError::InvalidCredentials);
        };

        let verified = self
            .password_hasher
            .verify(password, account.password_hash)
            .await
            .map_err(|e| AuthError::internal("verify_password", e))?;

        if !verified {
            tracing::debug!(
                target: TRACING_TARGET_AUTH,
                "login rejected: invalid credentials"
            );
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(
            target: TRACING_TARGET_AUTH,
            account_name = %account.name,
            "account authenticated"
        );

        Ok(AuthOutcome::Authenticated { name: account.name })
    }

    /// Checks that the credential store is reachable within the store timeout.
    pub async fn ping_store(&self) -> Result<(), AuthError> {
        self.store_call("ping", self.store.ping()).await
    }

    async fn store_call<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(StoreError::Conflict)) => Err(AuthError::AccountExists),
            Ok(Err(StoreError::Backend(error))) => Err(AuthError::internal(operation, error)),
            Err(elapsed) => Err(AuthError::internal(operation, elapsed)),
        }
    }
}
