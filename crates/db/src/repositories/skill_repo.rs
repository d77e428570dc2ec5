//! Repository for the `skills` table.

use coachdesk_core::skills::SkillRecord;
use coachdesk_core::types::DbId;
use sqlx::{FromRow, PgPool};

use super::escape_like;
use crate::models::skill::Skill;
use crate::models::upsert::UpsertOutcome;

/// Column list for `skills` queries.
const COLUMNS: &str = "id, name, category, description, created_at, updated_at";

/// Default number of search results.
const DEFAULT_SEARCH_LIMIT: i64 = 25;
/// Maximum number of search results.
const MAX_SEARCH_LIMIT: i64 = 200;

#[derive(Debug, FromRow)]
struct SkillUpsertRow {
    #[sqlx(flatten)]
    skill: Skill,
    inserted: bool,
}

/// Provides upsert and text search over skills.
pub struct SkillRepo;

impl SkillRepo {
    /// Insert a skill or update the existing one with the same name.
    pub async fn upsert_by_name(
        pool: &PgPool,
        record: &SkillRecord,
    ) -> Result<(Skill, UpsertOutcome), sqlx::Error> {
        let query = format!(
            "INSERT INTO skills (name, category, description) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (name) DO UPDATE \
             SET category = EXCLUDED.category, \
                 description = EXCLUDED.description \
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );
        let row = sqlx::query_as::<_, SkillUpsertRow>(&query)
            .bind(&record.name)
            .bind(&record.category)
            .bind(&record.description)
            .fetch_one(pool)
            .await?;
        Ok((row.skill, UpsertOutcome::from_inserted(row.inserted)))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Skill>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM skills WHERE id = $1");
        sqlx::query_as::<_, Skill>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Skill>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM skills WHERE name = $1");
        sqlx::query_as::<_, Skill>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Full-text search over name and description, optionally restricted to
    /// one category. Without `text`, lists by name.
    ///
    /// Matches either the text index or a name substring, ranked by the
    /// text-search score.
    pub async fn search(
        pool: &PgPool,
        text: Option<&str>,
        category: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<Skill>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
        let name_pattern = text.map(|t| format!("%{}%", escape_like(t)));

        let query = format!(
            "SELECT {COLUMNS} FROM skills \
             WHERE ($1::text IS NULL \
                    OR search_vector @@ (plainto_tsquery('simple', $1) || plainto_tsquery('english', $1)) \
                    OR name ILIKE $2) \
               AND ($3::text IS NULL OR category = $3) \
             ORDER BY ts_rank(search_vector, plainto_tsquery('simple', COALESCE($1, '')) \
                                             || plainto_tsquery('english', COALESCE($1, ''))) DESC, \
                      name ASC \
             LIMIT $4"
        );
        sqlx::query_as::<_, Skill>(&query)
            .bind(text)
            .bind(name_pattern)
            .bind(category)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every skill, grouped by category then name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Skill>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM skills ORDER BY category ASC, name ASC");
        sqlx::query_as::<_, Skill>(&query).fetch_all(pool).await
    }

    /// Skills that have no `skills_<id>` translation entry yet.
    pub async fn list_without_translation(pool: &PgPool) -> Result<Vec<Skill>, sqlx::Error> {
        let query = "SELECT s.id, s.name, s.category, s.description, s.created_at, s.updated_at \
                     FROM skills s \
                     LEFT JOIN translations t ON t.key = 'skills_' || s.id::text \
                     WHERE t.id IS NULL \
                     ORDER BY s.id ASC";
        sqlx::query_as::<_, Skill>(query).fetch_all(pool).await
    }
}
