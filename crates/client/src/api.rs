//! REST client for the admin endpoints.
//!
//! [`AdminApi`] wraps `/api/v1/admin/*` using [`reqwest`]. The controllers
//! in this crate depend on the narrow traits at the bottom of this module
//! rather than on the HTTP client, so they can run against in-memory fakes.

use async_trait::async_trait;
use coachdesk_core::layout::Layout;
use coachdesk_core::overview::{AdminOverview, OverviewQuery};
use coachdesk_core::types::{Cents, DbId, Timestamp};
use coachdesk_core::user_filters::UserFilters;
use coachdesk_core::widgets::WidgetConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;

/// Errors from the admin API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status. The message is the server's
    /// `error` field when present, else the raw body.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// `{ "data": ... }` envelope used by every admin endpoint.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// `{ "error": ..., "code": ... }` body of a failed request.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: Option<String>,
}

/// Result of a preference save: what was stored and the layout it yields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPreferences {
    pub dashboard_preferences: Option<Vec<WidgetConfig>>,
    pub layout: Layout,
}

/// A user row as listed in the admin user table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub status: String,
    pub email_verified: bool,
    pub has_coach_profile: bool,
    pub country: Option<String>,
    pub subscription_status: String,
    pub sessions_count: i64,
    pub revenue_cents: Cents,
    pub rating: Option<f64>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A payment row in the user detail panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: DbId,
    pub client_id: DbId,
    pub coach_id: DbId,
    pub amount_cents: Cents,
    pub platform_fee_cents: Cents,
    pub currency: String,
    pub status: String,
    pub session_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDetail {
    pub user: AdminUser,
    pub recent_transactions: Vec<TransactionRecord>,
}

/// One page of a filtered listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the admin API of one deployment.
#[derive(Debug, Clone)]
pub struct AdminApi {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl AdminApi {
    /// * `base_url` - Server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            api_url: format!("{}/api/v1/admin", base_url.trim_end_matches('/')),
            token,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, &config.base_url, config.token.clone()))
    }

    /// `GET /overview`
    pub async fn admin_overview(&self, query: &OverviewQuery) -> Result<AdminOverview, ClientError> {
        let request = self.get("/overview").query(query);
        Self::parse_data(request.send().await?).await
    }

    /// `PUT /dashboard/preferences`. `None` resets to registry defaults.
    pub async fn update_admin_dashboard_preferences(
        &self,
        preferences: Option<&[WidgetConfig]>,
    ) -> Result<SavedPreferences, ClientError> {
        let response = self
            .authorized(self.client.put(self.url("/dashboard/preferences")))
            .json(&preferences)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    /// `GET /users`
    pub async fn list_users(&self, filters: &UserFilters) -> Result<UserPage<AdminUser>, ClientError> {
        let request = self.get("/users").query(filters);
        Self::parse_data(request.send().await?).await
    }

    /// `GET /users/{id}`
    pub async fn admin_user_detail(&self, id: DbId) -> Result<AdminUserDetail, ClientError> {
        let request = self.get(&format!("/users/{id}"));
        Self::parse_data(request.send().await?).await
    }

    /// `GET /users/countries`
    pub async fn admin_unique_user_countries(&self) -> Result<Vec<String>, ClientError> {
        let request = self.get("/users/countries");
        Self::parse_data(request.send().await?).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorized(self.client.get(self.url(path)))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Turn a non-2xx response into [`ClientError::Api`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(api_error(status.as_u16(), &body))
    }

    async fn parse_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        let envelope: DataEnvelope<T> =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }
}

/// Build an [`ClientError::Api`] from a status and raw body.
fn api_error(status: u16, body: &str) -> ClientError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            tracing::debug!(status, code = ?parsed.code, "Admin API error");
            parsed.error
        }
        Err(_) if body.trim().is_empty() => format!("Request failed with status {status}"),
        Err(_) => body.to_string(),
    };
    ClientError::Api { status, message }
}

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Persists dashboard preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn save_preferences(&self, preferences: Option<&[WidgetConfig]>) -> Result<(), ClientError>;
}

/// Loads the overview aggregate.
#[async_trait]
pub trait OverviewSource: Send + Sync {
    async fn fetch_overview(&self, query: &OverviewQuery) -> Result<AdminOverview, ClientError>;
}

/// Read access to the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_users(&self, filters: &UserFilters) -> Result<UserPage<AdminUser>, ClientError>;

    async fn user_detail(&self, id: DbId) -> Result<AdminUserDetail, ClientError>;

    async fn countries(&self) -> Result<Vec<String>, ClientError>;
}

#[async_trait]
impl PreferenceStore for AdminApi {
    async fn save_preferences(&self, preferences: Option<&[WidgetConfig]>) -> Result<(), ClientError> {
        self.update_admin_dashboard_preferences(preferences).await?;
        Ok(())
    }
}

#[async_trait]
impl OverviewSource for AdminApi {
    async fn fetch_overview(&self, query: &OverviewQuery) -> Result<AdminOverview, ClientError> {
        self.admin_overview(query).await
    }
}

#[async_trait]
impl UserDirectory for AdminApi {
    async fn list_users(&self, filters: &UserFilters) -> Result<UserPage<AdminUser>, ClientError> {
        AdminApi::list_users(self, filters).await
    }

    async fn user_detail(&self, id: DbId) -> Result<AdminUserDetail, ClientError> {
        self.admin_user_detail(id).await
    }

    async fn countries(&self) -> Result<Vec<String>, ClientError> {
        self.admin_unique_user_countries().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn api_error_uses_server_message() {
        let err = api_error(409, r#"{"error":"Duplicate value","code":"CONFLICT"}"#);
        assert_matches!(&err, ClientError::Api { status: 409, .. });
        assert_eq!(err.to_string(), "Duplicate value");
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        assert_eq!(api_error(502, "Bad Gateway").to_string(), "Bad Gateway");
        assert_eq!(api_error(500, "  ").to_string(), "Request failed with status 500");
    }

    #[test]
    fn base_url_is_joined_without_double_slash() {
        let api = AdminApi::new("http://localhost:3000/", None);
        assert_eq!(api.url("/overview"), "http://localhost:3000/api/v1/admin/overview");
    }

    #[test]
    fn from_config_uses_configured_server_and_token() {
        let config = ClientConfig {
            base_url: "https://admin.coachdesk.test/".to_string(),
            token: Some("session-token".to_string()),
            ..ClientConfig::default()
        };
        let api = AdminApi::from_config(&config).unwrap();

        assert_eq!(api.url("/users"), "https://admin.coachdesk.test/api/v1/admin/users");
        assert_eq!(api.token.as_deref(), Some("session-token"));
    }

    #[test]
    fn saved_preferences_decode_null_as_reset() {
        let json = r#"{"data":{"dashboardPreferences":null,"layout":[]}}"#;
        let envelope: DataEnvelope<SavedPreferences> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.dashboard_preferences, None);
    }
}
