//! Route definitions for the admin back office, mounted at `/admin`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{dashboard_preferences, overview, skills, translations, users};
use crate::state::AppState;

/// ```text
/// GET    /overview                  -> overview::get_overview
/// PUT    /dashboard/preferences     -> dashboard_preferences::update_preferences
/// GET    /users                     -> users::list_users
/// GET    /users/countries           -> users::list_countries
/// GET    /users/{id}                -> users::get_user_detail
/// GET    /skills                    -> skills::search_skills
/// GET    /translations/{key}        -> translations::get_translation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(overview::get_overview))
        .route(
            "/dashboard/preferences",
            put(dashboard_preferences::update_preferences),
        )
        .route("/users", get(users::list_users))
        .route("/users/countries", get(users::list_countries))
        .route("/users/{id}", get(users::get_user_detail))
        .route("/skills", get(skills::search_skills))
        .route("/translations/{key}", get(translations::get_translation))
}
