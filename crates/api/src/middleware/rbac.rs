//! Role gate for the back office.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use coachdesk_core::error::CoreError;
use coachdesk_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated caller with the `admin` role.
///
/// Missing or invalid tokens reject with 401, other roles with 403.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role == ROLE_ADMIN {
            return Ok(RequireAdmin(user));
        }
        tracing::warn!(user_id = user.user_id, role = %user.role, "Non-admin caller rejected");
        Err(AppError::Core(CoreError::Forbidden(
            "The back office is restricted to administrators".into(),
        )))
    }
}
