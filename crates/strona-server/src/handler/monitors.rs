//! Health check handler.
//!
//! Reports whether the credential store is reachable. Results are cached by
//! [`HealthCache`] so frequent probes do not each hit the database.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;

use crate::extract::Json;
use crate::handler::response::HealthResponse;
use crate::service::{AuthService, HealthCache, ServiceState};

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "strona_server::handler::monitors";

#[tracing::instrument(skip_all)]
async fn health_status(
    State(auth_service): State<AuthService>,
    State(health_cache): State<HealthCache>,
) -> (StatusCode, Json<HealthResponse>) {
    let is_healthy = health_cache.is_healthy(&auth_service).await;

    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        is_healthy,
        status_code = status_code.as_u16(),
        "health status response prepared"
    );

    (status_code, Json(HealthResponse { is_healthy }))
}

/// Returns a [`Router`] with the health route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::handler::response::HealthResponse;
    use crate::handler::test::{create_test_server, create_test_server_with_store};
    use crate::service::test_stores::FailingCredentialStore;

    #[tokio::test]
    async fn healthy_store() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/health").await;
        response.assert_status_ok();
        assert!(response.json::<HealthResponse>().is_healthy);

        let body = response.json::<serde_json::Value>();
        assert_eq!(body, serde_json::json!({ "isHealthy": true }));

        Ok(())
    }

    #[tokio::test]
    async fn unreachable_store() -> anyhow::Result<()> {
        let server = create_test_server_with_store(Arc::new(FailingCredentialStore))?;

        let response = server.get("/health").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert!(!response.json::<HealthResponse>().is_healthy);

        Ok(())
    }
}
