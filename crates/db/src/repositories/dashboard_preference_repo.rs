//! Repository for the `admin_dashboard_preferences` table.

use coachdesk_core::types::DbId;
use coachdesk_core::widgets::WidgetConfig;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::dashboard_preference::DashboardPreference;

/// Column list for `admin_dashboard_preferences` queries.
const COLUMNS: &str = "user_id, widgets, created_at, updated_at";

/// Persists one dashboard layout per admin user.
pub struct DashboardPreferenceRepo;

impl DashboardPreferenceRepo {
    /// Find an admin's stored preferences. `None` if never saved.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<DashboardPreference>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM admin_dashboard_preferences WHERE user_id = $1");
        sqlx::query_as::<_, DashboardPreference>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Store (or clear, with `None`) an admin's widget layout.
    ///
    /// Uses `ON CONFLICT (user_id) DO UPDATE` to guarantee one row per user.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        widgets: Option<&[WidgetConfig]>,
    ) -> Result<DashboardPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO admin_dashboard_preferences (user_id, widgets) \
             VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET widgets = EXCLUDED.widgets \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DashboardPreference>(&query)
            .bind(user_id)
            .bind(widgets.map(Json))
            .fetch_one(pool)
            .await
    }
}
