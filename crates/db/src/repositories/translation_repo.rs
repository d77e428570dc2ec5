//! Repository for the `translations` table.

use coachdesk_core::translations::{LocaleStrings, TranslationKey};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use super::escape_like;
use crate::models::translation::Translation;
use crate::models::upsert::UpsertOutcome;

/// Column list for `translations` queries.
const COLUMNS: &str = "id, key, translations, created_at, updated_at";

#[derive(Debug, FromRow)]
struct TranslationUpsertRow {
    #[sqlx(flatten)]
    translation: Translation,
    inserted: bool,
}

/// Provides keyed access to per-locale translation maps.
pub struct TranslationRepo;

impl TranslationRepo {
    /// Insert a translation entry or merge `strings` into the existing one.
    ///
    /// Locales present in `strings` overwrite stored texts; other stored
    /// locales are kept.
    pub async fn upsert_by_key(
        pool: &PgPool,
        key: &TranslationKey,
        strings: &LocaleStrings,
    ) -> Result<(Translation, UpsertOutcome), sqlx::Error> {
        let query = format!(
            "INSERT INTO translations (key, translations) \
             VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE \
             SET translations = translations.translations || EXCLUDED.translations \
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );
        let row = sqlx::query_as::<_, TranslationUpsertRow>(&query)
            .bind(key.to_string())
            .bind(Json(strings))
            .fetch_one(pool)
            .await?;
        Ok((row.translation, UpsertOutcome::from_inserted(row.inserted)))
    }

    pub async fn find_by_key(
        pool: &PgPool,
        key: &TranslationKey,
    ) -> Result<Option<Translation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM translations WHERE key = $1");
        sqlx::query_as::<_, Translation>(&query)
            .bind(key.to_string())
            .fetch_optional(pool)
            .await
    }

    /// All entries of one list type (`<listType>_*`), ordered by key.
    pub async fn list_by_list_type(
        pool: &PgPool,
        list_type: &str,
    ) -> Result<Vec<Translation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM translations WHERE key LIKE $1 ORDER BY key ASC");
        sqlx::query_as::<_, Translation>(&query)
            .bind(format!("{}\\_%", escape_like(list_type)))
            .fetch_all(pool)
            .await
    }
}
