//! Operations routes
//!
//! Health check for monitoring. No authentication.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Operations routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server status
    pub status: &'static str,
    /// Whether the database answered a trivial query
    pub database: bool,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "health check: database unreachable");
            false
        }
    };

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}
