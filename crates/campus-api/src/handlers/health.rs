//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, ComponentHealth, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = state.repositories.health_check().await.unwrap_or(false);
    let storage = state.storage.health_check().await;

    Json(ApiResponse::ok(HealthResponse {
        status: if database && storage { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database: ComponentHealth {
            backend: state.repositories.backend().to_string(),
            healthy: database,
        },
        storage: ComponentHealth {
            backend: state.storage.provider().provider_type().to_string(),
            healthy: storage,
        },
    }))
}
