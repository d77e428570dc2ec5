//! Admin overview query parameters and KPI aggregate shapes.
//!
//! The overview endpoint returns one aggregate per request: KPI sections
//! for every widget, the caller's stored dashboard preferences, and a
//! system-health block. [`widget_panel`] maps a widget key to the slice of
//! the aggregate it renders.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::params::{blank_as_none, check_query_date};
use crate::types::{Cents, DbId, Timestamp};
use crate::widgets::{WidgetConfig, WidgetKey};

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Relative reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Timeframe {
    Day,
    Week,
    #[default]
    Month,
    Quarter,
    Year,
    AllTime,
}

/// Query parameters for the overview aggregate.
///
/// An explicit `start_date`/`end_date` pair overrides the timeframe. Both
/// dates are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewQuery {
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub end_date: Option<NaiveDate>,
}

/// Half-open UTC interval `[from, to)`. `from` is `None` for all-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<Timestamp>,
    pub to: Timestamp,
}

impl OverviewQuery {
    pub fn for_timeframe(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            ..Self::default()
        }
    }

    pub fn for_dates(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            timeframe: Timeframe::default(),
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }

    /// Reject half-specified, inverted or out-of-bounds explicit ranges.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_query_date("startDate", self.start_date)?;
        check_query_date("endDate", self.end_date)?;
        match (self.start_date, self.end_date) {
            (None, None) => Ok(()),
            (Some(start), Some(end)) if start <= end => Ok(()),
            (Some(_), Some(_)) => Err(CoreError::Validation(
                "startDate must not be after endDate".to_string(),
            )),
            _ => Err(CoreError::Validation(
                "startDate and endDate must be provided together".to_string(),
            )),
        }
    }

    /// Resolve the reporting interval relative to `now`. Expects a query
    /// that passed [`OverviewQuery::validate`].
    pub fn resolve_range(&self, now: Timestamp) -> DateRange {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            return DateRange {
                from: Some(start_of_day(start)),
                to: start_of_day(end.succ_opt().unwrap_or(NaiveDate::MAX)),
            };
        }

        let from = match self.timeframe {
            Timeframe::Day => Some(now - Duration::days(1)),
            Timeframe::Week => Some(now - Duration::weeks(1)),
            Timeframe::Month => Some(now - Duration::days(30)),
            Timeframe::Quarter => Some(now - Duration::days(90)),
            Timeframe::Year => {
                let date = now.date_naive();
                let year_ago = date.with_year(date.year() - 1).unwrap_or(date - Duration::days(365));
                Some(start_of_day(year_ago))
            }
            Timeframe::AllTime => None,
        };
        DateRange { from, to: now }
    }
}

fn start_of_day(date: NaiveDate) -> Timestamp {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

// ---------------------------------------------------------------------------
// Aggregate shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGrowthKpi {
    pub total_users: i64,
    pub new_users: i64,
    pub new_coaches: i64,
    pub new_clients: i64,
    /// Growth of `new_users` versus the preceding window of equal length.
    pub growth_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueKpi {
    pub gross_cents: Cents,
    pub platform_fee_cents: Cents,
    pub refunded_cents: Cents,
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsKpi {
    pub completed: i64,
    pub upcoming: i64,
    pub cancelled: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachApprovalsKpi {
    pub pending: i64,
    pub approved_in_range: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCoach {
    pub user_id: DbId,
    pub name: String,
    pub revenue_cents: Cents,
    pub sessions: i64,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSignup {
    pub user_id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub status: String,
    pub db_healthy: bool,
    pub version: String,
}

impl Default for SystemHealth {
    fn default() -> Self {
        Self {
            status: "unknown".to_string(),
            db_healthy: false,
            version: String::new(),
        }
    }
}

/// KPI sections, one per widget kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewKpis {
    pub user_growth: UserGrowthKpi,
    pub revenue: RevenueKpi,
    pub sessions: SessionsKpi,
    pub coach_approvals: CoachApprovalsKpi,
    pub top_coaches: Vec<TopCoach>,
    pub recent_signups: Vec<RecentSignup>,
}

/// Response of `GET /admin/overview`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub kpis: OverviewKpis,
    /// Stored layout preferences; `None` when never saved or reset.
    pub dashboard_preferences: Option<Vec<WidgetConfig>>,
    pub system_health: SystemHealth,
}

impl AdminOverview {
    /// Copy of `self` with different stored preferences.
    pub fn with_preferences(&self, preferences: Option<Vec<WidgetConfig>>) -> Self {
        Self {
            dashboard_preferences: preferences,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Widget dispatch
// ---------------------------------------------------------------------------

/// The data a widget renders, borrowed from an [`AdminOverview`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetPanel<'a> {
    UserGrowth(&'a UserGrowthKpi),
    Revenue(&'a RevenueKpi),
    Sessions(&'a SessionsKpi),
    CoachApprovals(&'a CoachApprovalsKpi),
    TopCoaches(&'a [TopCoach]),
    RecentSignups(&'a [RecentSignup]),
    PlatformHealth(&'a SystemHealth),
}

/// Select the slice of the overview a widget renders.
pub fn widget_panel(key: WidgetKey, overview: &AdminOverview) -> WidgetPanel<'_> {
    let kpis = &overview.kpis;
    match key {
        WidgetKey::UserGrowth => WidgetPanel::UserGrowth(&kpis.user_growth),
        WidgetKey::Revenue => WidgetPanel::Revenue(&kpis.revenue),
        WidgetKey::Sessions => WidgetPanel::Sessions(&kpis.sessions),
        WidgetKey::CoachApprovals => WidgetPanel::CoachApprovals(&kpis.coach_approvals),
        WidgetKey::TopCoaches => WidgetPanel::TopCoaches(&kpis.top_coaches),
        WidgetKey::RecentSignups => WidgetPanel::RecentSignups(&kpis.recent_signups),
        WidgetKey::PlatformHealth => WidgetPanel::PlatformHealth(&overview.system_health),
    }
}

/// Percentage change from `previous` to `current`. `None` when there is no
/// baseline to compare against.
pub fn growth_pct(current: i64, previous: i64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current - previous) as f64 / previous as f64 * 100.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
