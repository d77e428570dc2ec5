//! User entity model and DTOs for the admin user-management views.

use coachdesk_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Credentials live with the identity provider, so the row is safe to
/// return to admins as-is.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub status: String,
    pub email_verified: bool,
    pub has_coach_profile: bool,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub preferred_language: Option<String>,
    pub subscription_status: String,
    pub registration_source: Option<String>,
    pub sessions_count: i64,
    pub revenue_cents: Cents,
    pub rating: Option<f64>,
    pub coach_approved_at: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// `"First Last"`, falling back to the email when both names are blank.
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, &self.email)
    }
}

/// Compose a user's display name from its parts.
pub fn display_name(first_name: &str, last_name: &str, email: &str) -> String {
    let name = format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_string();
    if name.is_empty() {
        email.to_string()
    } else {
        name
    }
}

/// One page of the filtered user listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub items: Vec<User>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

/// A payment row as shown in the user detail panel.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub id: DbId,
    pub client_id: DbId,
    pub coach_id: DbId,
    pub amount_cents: Cents,
    pub platform_fee_cents: Cents,
    pub currency: String,
    pub status: String,
    pub session_at: Timestamp,
}

/// Response of `GET /admin/users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub user: User,
    pub recent_transactions: Vec<TransactionSummary>,
}

/// DTO for inserting a user (fixtures and imports).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Defaults to `client` when `None`.
    pub role: Option<String>,
    /// Defaults to `active` when `None`.
    pub status: Option<String>,
    pub country: Option<String>,
}
