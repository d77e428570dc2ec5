//! Handler for the admin overview aggregate.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use coachdesk_core::overview::{AdminOverview, OverviewQuery};
use coachdesk_db::repositories::{DashboardPreferenceRepo, OverviewRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::ApiQuery;
use crate::response::DataResponse;
use crate::routes::health;
use crate::state::AppState;

/// GET /api/v1/admin/overview?timeframe=&startDate=&endDate=
///
/// KPI sections for the requested window, the caller's stored dashboard
/// preferences (raw, unreconciled) and system health.
pub async fn get_overview(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OverviewQuery>,
) -> AppResult<impl IntoResponse> {
    query.validate()?;
    let range = query.resolve_range(Utc::now());

    let kpis = OverviewRepo::kpis(&state.pool, &range, state.config.overview_list_size).await?;
    let dashboard_preferences = DashboardPreferenceRepo::find_by_user(&state.pool, admin.user_id)
        .await?
        .and_then(|row| row.preferences());
    let system_health = health::check_health(&state.pool).await;

    tracing::debug!(
        user_id = admin.user_id,
        timeframe = ?query.timeframe,
        has_preferences = dashboard_preferences.is_some(),
        "Admin overview computed",
    );

    Ok(Json(DataResponse {
        data: AdminOverview {
            kpis,
            dashboard_preferences,
            system_health,
        },
    }))
}
