use axum::extract::State;
use axum::{routing::get, Json, Router};
use coachdesk_core::overview::SystemHealth;

use crate::state::AppState;

/// Check the database and report service health.
///
/// Shared by `GET /health` and the platform-health widget of the overview.
pub async fn check_health(pool: &coachdesk_db::DbPool) -> SystemHealth {
    let db_healthy = coachdesk_db::health_check(pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Database health check failed");
    }

    SystemHealth {
        status: if db_healthy { "ok" } else { "degraded" }.to_string(),
        db_healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// GET /health -- returns service and database health.
async fn health_check(State(state): State<AppState>) -> Json<SystemHealth> {
    Json(check_health(&state.pool).await)
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
