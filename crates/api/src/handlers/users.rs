//! Handlers for admin user management.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use coachdesk_core::error::CoreError;
use coachdesk_core::types::DbId;
use coachdesk_core::user_filters::UserFilters;
use coachdesk_db::models::user::UserDetail;
use coachdesk_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::ApiQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of transactions shown in the user detail panel.
const DETAIL_TRANSACTION_LIMIT: i64 = 10;

/// GET /api/v1/admin/users
///
/// Filtered, sorted and paged user listing.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(filters): ApiQuery<UserFilters>,
) -> AppResult<impl IntoResponse> {
    let filters = filters.normalized();
    filters.validate()?;

    let page = UserRepo::list_filtered(&state.pool, &filters).await?;

    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/admin/users/countries
///
/// Distinct user countries for the country filter.
pub async fn list_countries(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let countries = UserRepo::list_countries(&state.pool).await?;

    Ok(Json(DataResponse::new(countries)))
}

/// GET /api/v1/admin/users/{id}
///
/// Full user row plus recent transactions.
pub async fn get_user_detail(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    let recent_transactions =
        UserRepo::recent_transactions(&state.pool, user_id, DETAIL_TRANSACTION_LIMIT).await?;

    Ok(Json(DataResponse {
        data: UserDetail {
            user,
            recent_transactions,
        },
    }))
}
