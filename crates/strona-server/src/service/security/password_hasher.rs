//! Salted password hashing and verification using Argon2id.
//!
//! Digests are stored in PHC string format, so the algorithm, the work factor
//! and the salt travel with the hash. Verification reads the parameters back
//! from the digest, which keeps old digests valid after the work factor is
//! raised.

use std::fmt;
use std::sync::Arc;

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};
#[cfg(feature = "config")]
use clap::Args;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tracing target for password hashing operations.
const TRACING_TARGET_HASHER: &str = "strona_server::service::password_hasher";

/// Number of random salt bytes generated per digest.
const SALT_LEN: usize = 16;

/// Work factor of the password hasher.
///
/// Defaults are the Argon2id parameters recommended by the argon2 crate
/// (19 MiB of memory, 2 passes, 1 lane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct HasherConfig {
    /// Argon2 memory cost in KiB.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "HASHER_MEMORY_KIB", default_value_t = Params::DEFAULT_M_COST)
    )]
    pub hasher_memory_kib: u32,

    /// Argon2 number of passes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "HASHER_ITERATIONS", default_value_t = Params::DEFAULT_T_COST)
    )]
    pub hasher_iterations: u32,

    /// Argon2 degree of parallelism.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "HASHER_PARALLELISM", default_value_t = Params::DEFAULT_P_COST)
    )]
    pub hasher_parallelism: u32,
}

impl HasherConfig {
    /// Creates a new work factor.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            hasher_memory_kib: memory_kib,
            hasher_iterations: iterations,
            hasher_parallelism: parallelism,
        }
    }

    /// Converts the work factor into Argon2 parameters.
    ///
    /// # Errors
    ///
    /// Returns [`HasherError::Params`] if a value is outside the range Argon2
    /// accepts (for example less than `8 * parallelism` KiB of memory).
    pub fn params(&self) -> Result<Params, HasherError> {
        Params::new(
            self.hasher_memory_kib,
            self.hasher_iterations,
            self.hasher_parallelism,
            None,
        )
        .map_err(HasherError::Params)
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new(
            Params::DEFAULT_M_COST,
            Params::DEFAULT_T_COST,
            Params::DEFAULT_P_COST,
        )
    }
}

/// Failures of the password hasher.
#[derive(Debug, thiserror::Error)]
pub enum HasherError {
    /// The configured work factor is rejected by Argon2.
    #[error("invalid hasher parameters: {0}")]
    Params(argon2::Error),

    /// Salt encoding or hash computation failed.
    #[error("password hashing failed: {0}")]
    Hash(ArgonError),

    /// The stored digest is not a valid PHC string.
    #[error("malformed password digest: {0}")]
    MalformedDigest(ArgonError),

    /// The blocking task running the hasher panicked or was cancelled.
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Argon2id password hasher.
///
/// Cloning is cheap; all clones share the same parameters and dummy digest.
/// The synchronous methods burn CPU for the whole work factor, so request
/// handlers use the `async` variants, which run on the blocking thread pool.
#[derive(Clone)]
pub struct PasswordHasher {
    inner: Arc<PasswordHasherInner>,
}

struct PasswordHasherInner {
    argon2: Argon2<'static>,
    config: HasherConfig,
    dummy_hash: String,
}

impl PasswordHasher {
    /// Creates a new hasher with the given work factor.
    ///
    /// Also computes the digest used by [`verify_dummy_password`].
    ///
    /// [`verify_dummy_password`]: Self::verify_dummy_password
    pub fn new(config: &HasherConfig) -> Result<Self, HasherError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, config.params()?);

        let password_len = rand::random_range(16..32);
        let dummy_password: String = (0..password_len)
            .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
            .collect();
        let dummy_hash = hash_with(&argon2, &dummy_password)?;

        tracing::info!(
            target: TRACING_TARGET_HASHER,
            memory_kib = config.hasher_memory_kib,
            iterations = config.hasher_iterations,
            parallelism = config.hasher_parallelism,
            "password hasher initialized"
        );

        Ok(Self {
            inner: Arc::new(PasswordHasherInner {
                argon2,
                config: *config,
                dummy_hash,
            }),
        })
    }

    /// Returns the work factor used for new digests.
    #[inline]
    pub fn config(&self) -> &HasherConfig {
        &self.inner.config
    }

    /// Hashes a password with a fresh random salt.
    ///
    /// Returns a PHC string (`$argon2id$v=19$m=...`) suitable for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, HasherError> {
        hash_with(&self.inner.argon2, password)
    }

    /// Verifies a password against a stored digest.
    ///
    /// Returns `Ok(false)` on mismatch. Errors are reserved for malformed
    /// digests and hasher failures.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, HasherError> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET_HASHER,
                error = %e,
                "stored password digest is malformed"
            );
            HasherError::MalformedDigest(e)
        })?;

        match self
            .inner
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(ArgonError::Password) => {
                tracing::debug!(
                    target: TRACING_TARGET_HASHER,
                    "password does not match stored digest"
                );
                Ok(false)
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_HASHER,
                    error = %e,
                    "password verification failed"
                );
                Err(HasherError::Hash(e))
            }
        }
    }

    /// Runs a verification that always fails, against a digest of a random
    /// password computed at construction.
    ///
    /// Costs the same as [`verify_password`] so that a lookup miss cannot be
    /// told apart from a wrong password by timing.
    ///
    /// [`verify_password`]: Self::verify_password
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        let _ = self.verify_password(password, &self.inner.dummy_hash);
        false
    }

    /// [`hash_password`] on the blocking thread pool.
    ///
    /// [`hash_password`]: Self::hash_password
    pub async fn hash(&self, password: String) -> Result<String, HasherError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password)).await?
    }

    /// [`verify_password`] on the blocking thread pool.
    ///
    /// [`verify_password`]: Self::verify_password
    pub async fn verify(&self, password: String, stored_hash: String) -> Result<bool, HasherError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &stored_hash)).await?
    }

    /// [`verify_dummy_password`] on the blocking thread pool.
    ///
    /// [`verify_dummy_password`]: Self::verify_dummy_password
    pub async fn verify_dummy(&self, password: String) -> Result<bool, HasherError> {
        let hasher = self.clone();
        let verified =
            tokio::task::spawn_blocking(move || hasher.verify_dummy_password(&password)).await?;
        Ok(verified)
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, HasherError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    rand::rng().fill(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
        tracing::error!(
            target: TRACING_TARGET_HASHER,
            error = %e,
            "failed to encode password salt"
        );
        HasherError::Hash(e)
    })?;

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_HASHER,
                error = %e,
                "password hashing operation failed"
            );
            HasherError::Hash(e)
        })?;

    Ok(password_hash.to_string())
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
