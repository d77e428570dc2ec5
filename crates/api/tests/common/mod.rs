#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use coachdesk_api::auth::jwt::{issue_token, JwtConfig};
use coachdesk_api::config::ServerConfig;
use coachdesk_api::router::build_app_router;
use coachdesk_api::state::AppState;
use coachdesk_core::widgets::WidgetRegistry;
use coachdesk_db::models::user::{CreateUser, User};
use coachdesk_db::repositories::UserRepo;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        overview_list_size: 5,
        jwt: JwtConfig {
            secret: "coachdesk-integration-secret".to_string(),
            token_ttl_mins: 15,
            issuer: None,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        registry: Arc::new(WidgetRegistry::standard()),
    };
    build_app_router(state, &config)
}

/// Insert a user with the given role.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: role.to_string(),
        role: Some(role.to_string()),
        status: None,
        country: None,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Create an admin user and return it with a valid bearer token.
pub async fn admin_with_token(pool: &PgPool) -> (User, String) {
    let admin = create_user(pool, "admin@test.com", "admin").await;
    let token = token_for(admin.id, "admin");
    (admin, token)
}

pub fn token_for(user_id: i64, role: &str) -> String {
    issue_token(user_id, role, &test_config().jwt).expect("token should be issued")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
