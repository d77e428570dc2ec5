//! Result of an idempotent upsert.

use serde::Serialize;

/// Whether an upsert created a new row or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

impl UpsertOutcome {
    /// Map the `(xmax = 0) AS inserted` column returned by upsert queries.
    pub fn from_inserted(inserted: bool) -> Self {
        if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        }
    }
}
