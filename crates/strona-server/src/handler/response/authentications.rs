//! Authentication response types.

use serde::{Deserialize, Serialize};

use crate::service::AuthOutcome;

/// Body returned by a successful registration or login.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Name of the account the request acted on.
    pub username: String,
    /// Human-readable outcome, e.g. `Authenticated: alice`.
    pub message: String,
}

impl From<AuthOutcome> for AuthResponse {
    fn from(outcome: AuthOutcome) -> Self {
        match outcome {
            AuthOutcome::Created { name } => Self {
                message: "Account created".to_owned(),
                username: name,
            },
            AuthOutcome::Authenticated { name } => Self {
                message: format!("Authenticated: {name}"),
                username: name,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_message_names_the_account() {
        let response = AuthResponse::from(AuthOutcome::Authenticated {
            name: "alice".to_owned(),
        });

        assert_eq!(response.username, "alice");
        assert_eq!(response.message, "Authenticated: alice");
    }

    #[test]
    fn created_message() {
        let response = AuthResponse::from(AuthOutcome::Created {
            name: "bob".to_owned(),
        });

        assert_eq!(response.username, "bob");
        assert_eq!(response.message, "Account created");
    }
}
