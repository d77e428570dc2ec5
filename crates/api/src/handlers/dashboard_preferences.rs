//! Handler for saving and resetting the admin dashboard layout.
//!
//! The body is either an array of widget entries or `null`. `null` clears
//! the stored layout so the registry defaults apply. Entries with unknown
//! keys are stored as sent and dropped during reconciliation; entries with
//! an unknown size or a malformed shape are rejected.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use coachdesk_core::error::CoreError;
use coachdesk_core::layout::{reconcile, Layout};
use coachdesk_core::widgets::WidgetConfig;
use coachdesk_db::repositories::DashboardPreferenceRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound on stored entries; generous compared to the registry size.
const MAX_PREFERENCE_ENTRIES: usize = 64;

/// Response of `PUT /admin/dashboard/preferences`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    /// What was stored (`None` after a reset).
    pub dashboard_preferences: Option<Vec<WidgetConfig>>,
    /// The effective layout derived from it.
    pub layout: Layout,
}

/// PUT /api/v1/admin/dashboard/preferences
pub async fn update_preferences(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let widgets = parse_preferences_payload(&body)?;

    let stored =
        DashboardPreferenceRepo::upsert(&state.pool, admin.user_id, widgets.as_deref()).await?;
    let dashboard_preferences = stored.preferences();
    let layout = reconcile(dashboard_preferences.as_deref(), &state.registry);

    tracing::info!(
        user_id = admin.user_id,
        reset = dashboard_preferences.is_none(),
        entries = dashboard_preferences.as_ref().map_or(0, Vec::len),
        "Dashboard preferences updated",
    );

    Ok(Json(DataResponse {
        data: PreferencesResponse {
            dashboard_preferences,
            layout,
        },
    }))
}

/// Decode a preference body: `null` or an array of widget entries.
pub fn parse_preferences_payload(
    body: &serde_json::Value,
) -> Result<Option<Vec<WidgetConfig>>, CoreError> {
    let entries = match body {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Array(entries) => entries,
        _ => {
            return Err(CoreError::Validation(
                "Dashboard preferences must be an array or null".to_string(),
            ))
        }
    };

    if entries.len() > MAX_PREFERENCE_ENTRIES {
        return Err(CoreError::Validation(format!(
            "At most {MAX_PREFERENCE_ENTRIES} widget entries are allowed"
        )));
    }

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let widget: WidgetConfig = serde_json::from_value(entry.clone()).map_err(|e| {
                CoreError::Validation(format!("Invalid widget entry at index {idx}: {e}"))
            })?;
            if widget.key.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "Widget entry at index {idx} has an empty key"
                )));
            }
            Ok(widget)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use coachdesk_core::widgets::WidgetSize;
    use serde_json::json;

    #[test]
    fn null_body_is_a_reset() {
        assert_eq!(parse_preferences_payload(&json!(null)).unwrap(), None);
    }

    #[test]
    fn unknown_keys_are_accepted() {
        let parsed = parse_preferences_payload(&json!([
            { "key": "revenue", "enabled": false, "size": "Full" },
            { "key": "retiredWidget", "enabled": true }
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].size, Some(WidgetSize::Full));
        assert_eq!(parsed[1].size, None);
    }

    #[test]
    fn unknown_size_is_rejected() {
        let result = parse_preferences_payload(&json!([
            { "key": "revenue", "enabled": true, "size": "Huge" }
        ]));
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("index 0"));
    }

    #[test]
    fn object_body_is_rejected() {
        assert_matches!(
            parse_preferences_payload(&json!({ "widgets": [] })),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn empty_key_is_rejected() {
        assert_matches!(
            parse_preferences_payload(&json!([{ "key": " ", "enabled": true }])),
            Err(CoreError::Validation(_))
        );
    }
}
