//! Session extractor.
//!
//! [`AuthUser`] verifies the bearer token on every request that asks for
//! it. Handlers take [`super::rbac::RequireAdmin`] instead; it builds on
//! this extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use coachdesk_core::error::CoreError;
use coachdesk_core::types::DbId;

use crate::auth::jwt::{bearer_token, verify_token};
use crate::error::AppError;
use crate::state::AppState;

/// The caller behind a verified session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token =
            bearer_token(header).ok_or_else(|| unauthorized("Expected a Bearer token"))?;

        let claims = verify_token(token, &state.config.jwt).map_err(|err| {
            tracing::debug!(error = %err, "Rejected session token");
            unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}
