//! Aggregate queries backing the admin overview KPIs.

use coachdesk_core::overview::{
    growth_pct, CoachApprovalsKpi, DateRange, OverviewKpis, RecentSignup, RevenueKpi,
    SessionsKpi, TopCoach, UserGrowthKpi,
};
use coachdesk_core::types::{Cents, DbId, Timestamp};
use sqlx::{FromRow, PgPool};

use crate::models::user::display_name;

/// Currency reported when the range holds no transactions.
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, FromRow)]
struct UserGrowthRow {
    total_users: i64,
    new_users: i64,
    new_coaches: i64,
    new_clients: i64,
    previous_new_users: i64,
}

#[derive(Debug, FromRow)]
struct RevenueRow {
    gross_cents: Cents,
    platform_fee_cents: Cents,
    refunded_cents: Cents,
    currency: Option<String>,
}

#[derive(Debug, FromRow)]
struct TopCoachRow {
    user_id: DbId,
    first_name: String,
    last_name: String,
    email: String,
    rating: Option<f64>,
    revenue_cents: Cents,
    sessions: i64,
}

#[derive(Debug, FromRow)]
struct RecentSignupRow {
    id: DbId,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    created_at: Timestamp,
}

/// Computes the KPI sections of the admin overview.
pub struct OverviewRepo;

impl OverviewRepo {
    /// All KPI sections for `range`. `top_n` bounds the coach and signup lists.
    pub async fn kpis(
        pool: &PgPool,
        range: &DateRange,
        top_n: i64,
    ) -> Result<OverviewKpis, sqlx::Error> {
        Ok(OverviewKpis {
            user_growth: Self::user_growth(pool, range).await?,
            revenue: Self::revenue(pool, range).await?,
            sessions: Self::sessions(pool, range).await?,
            coach_approvals: Self::coach_approvals(pool, range).await?,
            top_coaches: Self::top_coaches(pool, range, top_n).await?,
            recent_signups: Self::recent_signups(pool, range, top_n).await?,
        })
    }

    /// Signup counts in `range`, compared against the preceding window of
    /// equal length. All-time ranges have no growth figure.
    pub async fn user_growth(pool: &PgPool, range: &DateRange) -> Result<UserGrowthKpi, sqlx::Error> {
        let previous_from = range
            .from
            .and_then(|from| from.checked_sub_signed(range.to - from));
        let row = sqlx::query_as::<_, UserGrowthRow>(
            "SELECT \
                COUNT(*) FILTER (WHERE created_at < $2) AS total_users, \
                COUNT(*) FILTER (WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
                                   AND created_at < $2) AS new_users, \
                COUNT(*) FILTER (WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
                                   AND created_at < $2 AND role = 'coach') AS new_coaches, \
                COUNT(*) FILTER (WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
                                   AND created_at < $2 AND role = 'client') AS new_clients, \
                COUNT(*) FILTER (WHERE $3::timestamptz IS NOT NULL \
                                   AND created_at >= $3 AND created_at < $1) AS previous_new_users \
             FROM users",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(previous_from)
        .fetch_one(pool)
        .await?;

        let growth = range
            .from
            .and_then(|_| growth_pct(row.new_users, row.previous_new_users));
        Ok(UserGrowthKpi {
            total_users: row.total_users,
            new_users: row.new_users,
            new_coaches: row.new_coaches,
            new_clients: row.new_clients,
            growth_pct: growth,
        })
    }

    pub async fn revenue(pool: &PgPool, range: &DateRange) -> Result<RevenueKpi, sqlx::Error> {
        let row = sqlx::query_as::<_, RevenueRow>(
            "SELECT \
                COALESCE(SUM(amount_cents) FILTER (WHERE status = 'completed'), 0)::bigint AS gross_cents, \
                COALESCE(SUM(platform_fee_cents) FILTER (WHERE status = 'completed'), 0)::bigint \
                    AS platform_fee_cents, \
                COALESCE(SUM(amount_cents) FILTER (WHERE status = 'refunded'), 0)::bigint AS refunded_cents, \
                MODE() WITHIN GROUP (ORDER BY currency) AS currency \
             FROM transactions \
             WHERE ($1::timestamptz IS NULL OR session_at >= $1) AND session_at < $2",
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_one(pool)
        .await?;

        Ok(RevenueKpi {
            gross_cents: row.gross_cents,
            platform_fee_cents: row.platform_fee_cents,
            refunded_cents: row.refunded_cents,
            currency: row.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }

    /// Completed and cancelled sessions in `range`; upcoming counts every
    /// scheduled session from now on regardless of the range.
    pub async fn sessions(pool: &PgPool, range: &DateRange) -> Result<SessionsKpi, sqlx::Error> {
        let (completed, upcoming, cancelled): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                COUNT(*) FILTER (WHERE status = 'completed' \
                                   AND ($1::timestamptz IS NULL OR session_at >= $1) \
                                   AND session_at < $2), \
                COUNT(*) FILTER (WHERE status = 'scheduled' AND session_at >= NOW()), \
                COUNT(*) FILTER (WHERE status = 'cancelled' \
                                   AND ($1::timestamptz IS NULL OR session_at >= $1) \
                                   AND session_at < $2) \
             FROM transactions",
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_one(pool)
        .await?;

        Ok(SessionsKpi {
            completed,
            upcoming,
            cancelled,
        })
    }

    pub async fn coach_approvals(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<CoachApprovalsKpi, sqlx::Error> {
        let (pending, approved_in_range): (i64, i64) = sqlx::query_as(
            "SELECT \
                COUNT(*) FILTER (WHERE status = 'pending'), \
                COUNT(*) FILTER (WHERE coach_approved_at IS NOT NULL \
                                   AND ($1::timestamptz IS NULL OR coach_approved_at >= $1) \
                                   AND coach_approved_at < $2) \
             FROM users WHERE role = 'coach'",
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_one(pool)
        .await?;

        Ok(CoachApprovalsKpi {
            pending,
            approved_in_range,
        })
    }

    /// Coaches ranked by completed-session revenue in `range`.
    pub async fn top_coaches(
        pool: &PgPool,
        range: &DateRange,
        limit: i64,
    ) -> Result<Vec<TopCoach>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TopCoachRow>(
            "SELECT u.id AS user_id, u.first_name, u.last_name, u.email, u.rating, \
                    COALESCE(SUM(t.amount_cents), 0)::bigint AS revenue_cents, \
                    COUNT(t.id) AS sessions \
             FROM users u \
             JOIN transactions t ON t.coach_id = u.id \
                 AND t.status = 'completed' \
                 AND ($1::timestamptz IS NULL OR t.session_at >= $1) \
                 AND t.session_at < $2 \
             WHERE u.role = 'coach' \
             GROUP BY u.id \
             ORDER BY revenue_cents DESC, u.id ASC \
             LIMIT $3",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopCoach {
                user_id: row.user_id,
                name: display_name(&row.first_name, &row.last_name, &row.email),
                revenue_cents: row.revenue_cents,
                sessions: row.sessions,
                rating: row.rating,
            })
            .collect())
    }

    /// Newest signups in `range`.
    pub async fn recent_signups(
        pool: &PgPool,
        range: &DateRange,
        limit: i64,
    ) -> Result<Vec<RecentSignup>, sqlx::Error> {
        let rows = sqlx::query_as::<_, RecentSignupRow>(
            "SELECT id, first_name, last_name, email, role, created_at FROM users \
             WHERE ($1::timestamptz IS NULL OR created_at >= $1) AND created_at < $2 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RecentSignup {
                user_id: row.id,
                name: display_name(&row.first_name, &row.last_name, &row.email),
                email: row.email,
                role: row.role,
                created_at: row.created_at,
            })
            .collect())
    }
}
