use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use coachdesk_core::user_filters::normalize_text;
use coachdesk_db::repositories::SkillRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{ApiQuery, SkillSearchParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/skills?search=&category=&limit=
///
/// Text search over the skill taxonomy. Without `search`, lists by name.
pub async fn search_skills(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SkillSearchParams>,
) -> AppResult<impl IntoResponse> {
    let search = normalize_text(params.search);
    let category = normalize_text(params.category);

    let skills =
        SkillRepo::search(&state.pool, search.as_deref(), category.as_deref(), params.limit)
            .await?;

    Ok(Json(DataResponse::new(skills)))
}
