//! Admin dashboard preference model.

use coachdesk_core::types::{DbId, Timestamp};
use coachdesk_core::widgets::WidgetConfig;
use sqlx::FromRow;

/// A row from the `admin_dashboard_preferences` table.
///
/// `widgets` is kept as raw JSON: rows written by older dashboards may hold
/// entries this build cannot parse, and those must not fail the whole read.
#[derive(Debug, Clone, FromRow)]
pub struct DashboardPreference {
    pub user_id: DbId,
    pub widgets: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DashboardPreference {
    /// Parsed widget entries. `None` means "use registry defaults".
    ///
    /// Malformed entries are skipped; a non-array value counts as unset.
    pub fn preferences(&self) -> Option<Vec<WidgetConfig>> {
        let entries = self.widgets.as_ref()?.as_array()?;
        Some(
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value::<WidgetConfig>(entry.clone()).ok())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(widgets: Option<serde_json::Value>) -> DashboardPreference {
        DashboardPreference {
            user_id: 1,
            widgets,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn null_widgets_means_unset() {
        assert_eq!(row(None).preferences(), None);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let widgets = serde_json::json!([
            { "key": "revenue", "enabled": true },
            { "key": "sessions", "enabled": "yes" },
            { "key": "userGrowth", "enabled": false, "size": "Gigantic" },
            42
        ]);
        let prefs = row(Some(widgets)).preferences().unwrap();
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].key, "revenue");
    }

    #[test]
    fn non_array_counts_as_unset() {
        assert_eq!(row(Some(serde_json::json!({}))).preferences(), None);
    }
}
