//! Translation entity model.

use coachdesk_core::translations::LocaleStrings;
use coachdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `translations` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub id: DbId,
    pub key: String,
    pub translations: Json<LocaleStrings>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
