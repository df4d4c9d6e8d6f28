//! `GET /health`, mounted outside `/api/v1` and without authentication so
//! load balancers can poll it.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"`, or `"degraded"` when the reconciliation store cannot be
    /// reached. Submissions and reviews fail while degraded.
    pub status: &'static str,
    pub version: &'static str,
    /// Result of the store's round trip (`SELECT 1` on PostgreSQL).
    pub db_healthy: bool,
}

/// Always 200; callers read `status` rather than the HTTP code.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match state.service.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Reconciliation store health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
