//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::store::ADMINS;
use crate::state::AppState;

/// Document probed by the readiness check. It never needs to exist.
const READINESS_PROBE_ID: &str = "_readiness";

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Performs one document lookup. Returns 503 Service Unavailable if the
/// document store cannot be reached or refuses our credentials.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().exists(ADMINS, READINESS_PROBE_ID).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
