use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use coachdesk_core::translations::{missing_locales, LocaleStrings, TranslationKey};
use coachdesk_db::repositories::TranslationRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// A translation entry with its coverage gaps.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationView {
    pub key: String,
    pub translations: LocaleStrings,
    pub missing_locales: Vec<&'static str>,
}

/// GET /api/v1/admin/translations/{key}
///
/// `key` has the form `<listType>_<id>`, e.g. `skills_42`.
pub async fn get_translation(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let key: TranslationKey = raw_key.parse()?;

    let entry = TranslationRepo::find_by_key(&state.pool, &key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Translation '{key}' not found")))?;
    let translations = entry.translations.0;

    Ok(Json(DataResponse {
        data: TranslationView {
            key: entry.key,
            missing_locales: missing_locales(&translations),
            translations,
        },
    }))
}
