//! Query-string extraction for the admin handlers.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use coachdesk_core::error::CoreError;
use coachdesk_core::params::blank_as_none;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::AppError;

/// [`Query`] whose rejection is a `VALIDATION_ERROR` in the usual
/// `{error, code}` body instead of axum's plain-text 400.
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                tracing::debug!(error = %message, "Query string rejected");
                Err(AppError::Core(CoreError::Validation(message)))
            }
        }
    }
}

/// Query parameters for `GET /admin/skills`.
#[derive(Debug, Default, Deserialize)]
pub struct SkillSearchParams {
    /// Free text matched against the skill text index and names.
    pub search: Option<String>,
    /// Restrict to one category (exact match).
    pub category: Option<String>,
    /// Maximum number of results. Clamped in the repository layer.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<i64>,
}
