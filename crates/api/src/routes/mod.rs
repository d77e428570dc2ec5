pub mod admin;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/overview                                   KPIs + stored layout (GET)
/// /admin/dashboard/preferences                      save or reset layout (PUT)
/// /admin/users                                      filtered listing (GET)
/// /admin/users/countries                            distinct countries (GET)
/// /admin/users/{id}                                 user detail (GET)
/// /admin/skills                                     skill search (GET)
/// /admin/translations/{key}                         translation entry (GET)
/// ```
///
/// Every route requires an admin JWT.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/admin", admin::router())
}
