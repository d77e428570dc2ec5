//! Skill entity model.

use coachdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `skills` table (the generated `search_vector` column is
/// never selected).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
