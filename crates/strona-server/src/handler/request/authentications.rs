//! Authentication request types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Request payload for both registration and login.
///
/// Missing fields deserialize as empty strings; the auth service rejects
/// them as invalid input.
#[must_use]
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name, used as given.
    #[serde(default)]
    pub username: String,

    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// Creates a new credentials payload.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_empty() -> anyhow::Result<()> {
        let credentials: Credentials = serde_json::from_str("{}")?;
        assert!(credentials.username.is_empty());
        assert!(credentials.password.is_empty());
        Ok(())
    }

    #[test]
    fn debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("alice", "secret123"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret123"));
    }
}
