//! Monitor response types.

use serde::{Deserialize, Serialize};

/// Health status of the server and its credential store.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Whether the credential store answered the last check.
    pub is_healthy: bool,
}
