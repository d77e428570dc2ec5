//! Repository for the `users` table and the admin user listing.

use chrono::{NaiveDate, NaiveTime};
use coachdesk_core::types::{DbId, Timestamp};
use coachdesk_core::user_filters::UserFilters;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, PgPool};

use super::escape_like;
use crate::models::user::{CreateUser, TransactionSummary, User, UserPage};

/// Column list for `users` queries.
const COLUMNS: &str = "id, email, first_name, last_name, role, status, email_verified, \
    has_coach_profile, country, gender, preferred_language, subscription_status, \
    registration_source, sessions_count, revenue_cents, rating, coach_approved_at, \
    last_login_at, created_at, updated_at";

/// Column list for transaction summaries.
const TRANSACTION_COLUMNS: &str =
    "id, client_id, coach_id, amount_cents, platform_fee_cents, currency, status, session_at";

/// Filter predicate shared by the page and count queries.
///
/// Every filter is a `($n IS NULL OR ...)` guard so one statement serves
/// any combination of filters. Date upper bounds are exclusive; callers
/// bind the day after the inclusive end date.
const FILTER_CLAUSE: &str = "\
    ($1::text IS NULL OR email ILIKE $1 OR first_name ILIKE $1 OR last_name ILIKE $1 \
        OR (first_name || ' ' || last_name) ILIKE $1) \
    AND ($2::text IS NULL OR role = $2) \
    AND ($3::text IS NULL OR status = $3) \
    AND ($4::boolean IS NULL OR email_verified = $4) \
    AND ($5::boolean IS NULL OR has_coach_profile = $5) \
    AND ($6::text IS NULL OR country = $6) \
    AND ($7::text IS NULL OR gender = $7) \
    AND ($8::text IS NULL OR preferred_language = $8) \
    AND ($9::text IS NULL OR subscription_status = $9) \
    AND ($10::text IS NULL OR registration_source = $10) \
    AND ($11::bigint IS NULL OR sessions_count >= $11) \
    AND ($12::bigint IS NULL OR sessions_count <= $12) \
    AND ($13::bigint IS NULL OR revenue_cents >= $13) \
    AND ($14::bigint IS NULL OR revenue_cents <= $14) \
    AND ($15::float8 IS NULL OR rating >= $15) \
    AND ($16::float8 IS NULL OR rating <= $16) \
    AND ($17::timestamptz IS NULL OR created_at >= $17) \
    AND ($18::timestamptz IS NULL OR created_at < $18) \
    AND ($19::timestamptz IS NULL OR last_login_at >= $19) \
    AND ($20::timestamptz IS NULL OR last_login_at < $20)";

/// Number of bind parameters used by [`FILTER_CLAUSE`].
const FILTER_PARAMS: usize = 20;

/// Provides lookups and the filtered listing over users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, first_name, last_name, role, status, country) \
             VALUES ($1, $2, $3, COALESCE($4, 'client'), COALESCE($5, 'active'), $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.role)
            .bind(&input.status)
            .bind(&input.country)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// One page of users matching `filters`, plus the total match count.
    ///
    /// `filters` is expected to be normalized and validated by the caller.
    pub async fn list_filtered(pool: &PgPool, filters: &UserFilters) -> Result<UserPage, sqlx::Error> {
        let direction = filters.sort_order.as_sql();
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE {FILTER_CLAUSE} \
             ORDER BY {column} {direction} NULLS LAST, id {direction} \
             LIMIT ${limit_idx} OFFSET ${offset_idx}",
            column = filters.sort_field.column(),
            limit_idx = FILTER_PARAMS + 1,
            offset_idx = FILTER_PARAMS + 2,
        );

        let mut page_args = filter_arguments(filters)?;
        page_args
            .add(i64::from(filters.limit))
            .map_err(sqlx::Error::Encode)?;
        page_args.add(filters.offset()).map_err(sqlx::Error::Encode)?;

        let items = sqlx::query_as_with::<_, User, _>(&query, page_args)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM users WHERE {FILTER_CLAUSE}");
        let total = sqlx::query_scalar_with::<_, i64, _>(&count_query, filter_arguments(filters)?)
            .fetch_one(pool)
            .await?;

        tracing::debug!(
            active_filters = filters.active_filter_count(),
            total,
            returned = items.len(),
            "Listed users",
        );

        Ok(UserPage {
            items,
            total,
            page: filters.page,
            limit: filters.limit,
        })
    }

    /// Distinct non-empty countries, for the country filter dropdown.
    pub async fn list_countries(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT country FROM users \
             WHERE country IS NOT NULL AND country <> '' \
             ORDER BY country ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Most recent transactions where the user is the client or the coach.
    pub async fn recent_transactions(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<TransactionSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE client_id = $1 OR coach_id = $1 \
             ORDER BY session_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, TransactionSummary>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

/// Bind the [`FILTER_CLAUSE`] parameters in order.
fn filter_arguments(filters: &UserFilters) -> Result<PgArguments, sqlx::Error> {
    let mut args = PgArguments::default();
    let search = filters
        .search
        .as_deref()
        .map(|s| format!("%{}%", escape_like(s)));

    args.add(search).map_err(sqlx::Error::Encode)?;
    args.add(filters.role.map(|r| r.as_str()))
        .map_err(sqlx::Error::Encode)?;
    args.add(filters.status.map(|s| s.as_str()))
        .map_err(sqlx::Error::Encode)?;
    args.add(filters.email_verified).map_err(sqlx::Error::Encode)?;
    args.add(filters.has_coach_profile)
        .map_err(sqlx::Error::Encode)?;
    args.add(filters.country.clone()).map_err(sqlx::Error::Encode)?;
    args.add(filters.gender.clone()).map_err(sqlx::Error::Encode)?;
    args.add(filters.preferred_language.clone())
        .map_err(sqlx::Error::Encode)?;
    args.add(filters.subscription_status.map(|s| s.as_str()))
        .map_err(sqlx::Error::Encode)?;
    args.add(filters.registration_source.clone())
        .map_err(sqlx::Error::Encode)?;
    args.add(filters.min_sessions).map_err(sqlx::Error::Encode)?;
    args.add(filters.max_sessions).map_err(sqlx::Error::Encode)?;
    args.add(filters.min_revenue).map_err(sqlx::Error::Encode)?;
    args.add(filters.max_revenue).map_err(sqlx::Error::Encode)?;
    args.add(filters.min_rating).map_err(sqlx::Error::Encode)?;
    args.add(filters.max_rating).map_err(sqlx::Error::Encode)?;
    args.add(filters.created_from.map(day_start))
        .map_err(sqlx::Error::Encode)?;
    args.add(filters.created_to.and_then(day_after))
        .map_err(sqlx::Error::Encode)?;
    args.add(filters.last_login_from.map(day_start))
        .map_err(sqlx::Error::Encode)?;
    args.add(filters.last_login_to.and_then(day_after))
        .map_err(sqlx::Error::Encode)?;
    Ok(args)
}

fn day_start(date: NaiveDate) -> Timestamp {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Midnight after `date`; `None` past the last representable day.
fn day_after(date: NaiveDate) -> Option<Timestamp> {
    date.succ_opt().map(day_start)
}
