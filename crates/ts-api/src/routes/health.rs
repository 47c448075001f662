//! Health check endpoints.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Creates health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: DatabaseHealth,
}

/// Database health details.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatabaseHealth {
    pub healthy: bool,
    pub db_type: String,
}

/// Overall service health.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let healthy = state.db.is_healthy().await;

    Json(HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        database: DatabaseHealth {
            healthy,
            db_type: state.db.db_type().to_string(),
        },
    })
}

/// Readiness probe: the service can reach its database.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Ready"),
        (status = 503, description = "Not ready")
    ),
    tag = "Health"
)]
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    if state.db.is_healthy().await {
        Ok(Json(serde_json::json!({ "status": "ready" })))
    } else {
        Err(axum::http::StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// Liveness probe: the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Alive")
    ),
    tag = "Health"
)]
pub async fn liveness_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "alive" }))
}
