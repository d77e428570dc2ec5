//! User-management filter state.
//!
//! [`UserFilters`] is the flat query object sent to the user-listing
//! endpoint. Its fields fall into two disjoint groups:
//!
//! - paging/sorting: `page`, `limit`, `sort_field`, `sort_order`
//! - filtering: everything else, projected by [`UserFilters::filtering_fields`]
//!
//! A selected user is only meaningful within a stable filter result set, so
//! [`SelectionState::on_filters_changed`] clears the selection whenever the
//! filtering group changes. Paging and sorting never clear it.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::params::{blank_as_none, check_query_date, parse_serde_name};
use crate::types::Cents;

/// Default page size for the user table.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
/// Upper bound on the page size.
pub const MAX_PAGE_LIMIT: u32 = 100;
/// Ratings are on a 0–5 scale.
pub const MAX_RATING: f64 = 5.0;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Client,
    Coach,
    Admin,
}

impl FromStr for UserRole {
    type Err = serde::de::value::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_serde_name(raw)
    }
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Client => crate::roles::ROLE_CLIENT,
            UserRole::Coach => crate::roles::ROLE_COACH,
            UserRole::Admin => crate::roles::ROLE_ADMIN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Pending,
    Suspended,
    Deactivated,
}

impl FromStr for UserStatus {
    type Err = serde::de::value::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_serde_name(raw)
    }
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Pending => "pending",
            UserStatus::Suspended => "suspended",
            UserStatus::Deactivated => "deactivated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Free,
    Trial,
    Active,
    PastDue,
    Cancelled,
}

impl FromStr for SubscriptionStatus {
    type Err = serde::de::value::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_serde_name(raw)
    }
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Free => "free",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

/// Sortable columns of the user table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserSortField {
    #[default]
    CreatedAt,
    LastLoginAt,
    Email,
    LastName,
    SessionsCount,
    Revenue,
    Rating,
}

impl UserSortField {
    /// Column name in the `users` table. Only these fixed strings are ever
    /// interpolated into SQL.
    pub fn column(self) -> &'static str {
        match self {
            UserSortField::CreatedAt => "created_at",
            UserSortField::LastLoginAt => "last_login_at",
            UserSortField::Email => "email",
            UserSortField::LastName => "last_name",
            UserSortField::SessionsCount => "sessions_count",
            UserSortField::Revenue => "revenue_cents",
            UserSortField::Rating => "rating",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

// ---------------------------------------------------------------------------
// Filter object
// ---------------------------------------------------------------------------

/// Query parameters of `GET /admin/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserFilters {
    // -- paging / sorting --
    pub page: u32,
    pub limit: u32,
    pub sort_field: UserSortField,
    pub sort_order: SortOrder,

    // -- filtering --
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub role: Option<UserRole>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub status: Option<UserStatus>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub email_verified: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub has_coach_profile: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub subscription_status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_source: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub min_sessions: Option<i64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub max_sessions: Option<i64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub min_revenue: Option<Cents>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub max_revenue: Option<Cents>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub min_rating: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub max_rating: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub created_from: Option<NaiveDate>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub created_to: Option<NaiveDate>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub last_login_from: Option<NaiveDate>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub last_login_to: Option<NaiveDate>,
}

impl Default for UserFilters {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            sort_field: UserSortField::default(),
            sort_order: SortOrder::default(),
            search: None,
            role: None,
            status: None,
            email_verified: None,
            has_coach_profile: None,
            country: None,
            gender: None,
            preferred_language: None,
            subscription_status: None,
            registration_source: None,
            min_sessions: None,
            max_sessions: None,
            min_revenue: None,
            max_revenue: None,
            min_rating: None,
            max_rating: None,
            created_from: None,
            created_to: None,
            last_login_from: None,
            last_login_to: None,
        }
    }
}

/// A rating filter bound, equal to itself even when NaN so a stray
/// non-number never reads as a filter change.
#[derive(Debug, Clone, Copy)]
pub struct RatingBound(pub f64);

impl PartialEq for RatingBound {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0).is_eq()
    }
}

/// The filtering subset of [`UserFilters`], without paging or sorting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteringFields {
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub email_verified: Option<bool>,
    pub has_coach_profile: Option<bool>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub preferred_language: Option<String>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub registration_source: Option<String>,
    pub min_sessions: Option<i64>,
    pub max_sessions: Option<i64>,
    pub min_revenue: Option<Cents>,
    pub max_revenue: Option<Cents>,
    pub min_rating: Option<RatingBound>,
    pub max_rating: Option<RatingBound>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub last_login_from: Option<NaiveDate>,
    pub last_login_to: Option<NaiveDate>,
}

impl FilteringFields {
    /// Number of fields set away from their initial (unset) value.
    pub fn active_count(&self) -> usize {
        [
            self.search.is_some(),
            self.role.is_some(),
            self.status.is_some(),
            self.email_verified.is_some(),
            self.has_coach_profile.is_some(),
            self.country.is_some(),
            self.gender.is_some(),
            self.preferred_language.is_some(),
            self.subscription_status.is_some(),
            self.registration_source.is_some(),
            self.min_sessions.is_some(),
            self.max_sessions.is_some(),
            self.min_revenue.is_some(),
            self.max_revenue.is_some(),
            self.min_rating.is_some(),
            self.max_rating.is_some(),
            self.created_from.is_some(),
            self.created_to.is_some(),
            self.last_login_from.is_some(),
            self.last_login_to.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

impl UserFilters {
    /// Project out the filtering subset.
    pub fn filtering_fields(&self) -> FilteringFields {
        FilteringFields {
            search: self.search.clone(),
            role: self.role,
            status: self.status,
            email_verified: self.email_verified,
            has_coach_profile: self.has_coach_profile,
            country: self.country.clone(),
            gender: self.gender.clone(),
            preferred_language: self.preferred_language.clone(),
            subscription_status: self.subscription_status,
            registration_source: self.registration_source.clone(),
            min_sessions: self.min_sessions,
            max_sessions: self.max_sessions,
            min_revenue: self.min_revenue,
            max_revenue: self.max_revenue,
            min_rating: self.min_rating.map(RatingBound),
            max_rating: self.max_rating.map(RatingBound),
            created_from: self.created_from,
            created_to: self.created_to,
            last_login_from: self.last_login_from,
            last_login_to: self.last_login_to,
        }
    }

    /// Number of active filtering fields. Paging and sorting never count.
    pub fn active_filter_count(&self) -> usize {
        self.filtering_fields().active_count()
    }

    /// Whether the filtering subset differs between `prev` and `next`.
    pub fn filters_changed(prev: &UserFilters, next: &UserFilters) -> bool {
        prev.filtering_fields() != next.filtering_fields()
    }

    /// Same filters with free-text fields trimmed and blanks unset.
    pub fn normalized(mut self) -> Self {
        self.search = normalize_text(self.search);
        self.country = normalize_text(self.country);
        self.gender = normalize_text(self.gender);
        self.preferred_language = normalize_text(self.preferred_language);
        self.registration_source = normalize_text(self.registration_source);
        self
    }

    /// Row offset of the current page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }

    /// Validate paging bounds, date bounds and range ordering.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page == 0 {
            return Err(CoreError::validation("page must be at least 1"));
        }
        if self.limit == 0 || self.limit > MAX_PAGE_LIMIT {
            return Err(CoreError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        for (field, date) in [
            ("createdFrom", self.created_from),
            ("createdTo", self.created_to),
            ("lastLoginFrom", self.last_login_from),
            ("lastLoginTo", self.last_login_to),
        ] {
            check_query_date(field, date)?;
        }
        check_order("sessions", self.min_sessions, self.max_sessions)?;
        check_order("revenue", self.min_revenue, self.max_revenue)?;
        check_order("rating", self.min_rating, self.max_rating)?;
        check_order("created", self.created_from, self.created_to)?;
        check_order("last login", self.last_login_from, self.last_login_to)?;

        for rating in [self.min_rating, self.max_rating].into_iter().flatten() {
            if !(0.0..=MAX_RATING).contains(&rating) {
                return Err(CoreError::Validation(format!(
                    "rating must be between 0 and {MAX_RATING}"
                )));
            }
        }
        Ok(())
    }
}

fn check_order<T: PartialOrd>(name: &str, low: Option<T>, high: Option<T>) -> Result<(), CoreError> {
    match (low, high) {
        (Some(low), Some(high)) if low > high => Err(CoreError::Validation(format!(
            "{name} range lower bound must not exceed upper bound"
        ))),
        _ => Ok(()),
    }
}

/// Trim a free-text filter; blank input unsets it.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The entity shown in the detail panel, scoped to the current result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState<T> {
    selected: Option<T>,
}

impl<T> Default for SelectionState<T> {
    fn default() -> Self {
        Self { selected: None }
    }
}

impl<T> SelectionState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, item: T) {
        self.selected = Some(item);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    /// Apply the filter transition `prev -> next`. Returns `true` if the
    /// selection was cleared.
    pub fn on_filters_changed(&mut self, prev: &UserFilters, next: &UserFilters) -> bool {
        if self.selected.is_none() || !UserFilters::filters_changed(prev, next) {
            return false;
        }
        self.selected = None;
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn selected(id: i64) -> SelectionState<i64> {
        let mut state = SelectionState::new();
        state.select(id);
        state
    }

    // -- selection-clear rule ---------------------------------------------

    #[test]
    fn paging_and_sorting_changes_keep_selection() {
        let prev = UserFilters::default();
        let variants = [
            UserFilters { page: 2, ..prev.clone() },
            UserFilters { limit: 50, ..prev.clone() },
            UserFilters { sort_field: UserSortField::Email, ..prev.clone() },
            UserFilters { sort_order: SortOrder::Asc, ..prev.clone() },
        ];
        for next in variants {
            let mut state = selected(7);
            assert!(!state.on_filters_changed(&prev, &next));
            assert_eq!(state.selected(), Some(&7));
        }
    }

    #[test]
    fn role_change_clears_selection() {
        let prev = UserFilters::default();
        let next = UserFilters {
            role: Some(UserRole::Coach),
            ..prev.clone()
        };
        let mut state = selected(7);

        assert!(state.on_filters_changed(&prev, &next));
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn any_filtering_field_change_clears_selection() {
        let prev = UserFilters::default();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1);
        let variants = [
            UserFilters { search: Some("ana".into()), ..prev.clone() },
            UserFilters { status: Some(UserStatus::Suspended), ..prev.clone() },
            UserFilters { email_verified: Some(false), ..prev.clone() },
            UserFilters { country: Some("IL".into()), ..prev.clone() },
            UserFilters { min_rating: Some(4.5), ..prev.clone() },
            UserFilters { max_revenue: Some(10_000), ..prev.clone() },
            UserFilters { last_login_to: date, ..prev.clone() },
            UserFilters { subscription_status: Some(SubscriptionStatus::PastDue), ..prev.clone() },
        ];
        for next in variants {
            let mut state = selected(1);
            assert!(state.on_filters_changed(&prev, &next), "{next:?} should clear");
        }
    }

    #[test]
    fn page_change_with_nan_rating_keeps_selection() {
        let prev = UserFilters {
            min_rating: Some(f64::NAN),
            ..UserFilters::default()
        };
        let next = UserFilters { page: 2, ..prev.clone() };
        let mut state = selected(7);

        assert!(!state.on_filters_changed(&prev, &next));
        assert_eq!(state.selected(), Some(&7));
    }

    #[test]
    fn filter_and_page_change_together_clears_selection() {
        let prev = UserFilters::default();
        let next = UserFilters {
            page: 3,
            search: Some("x".into()),
            ..prev.clone()
        };
        let mut state = selected(1);
        assert!(state.on_filters_changed(&prev, &next));
    }

    #[test]
    fn empty_selection_reports_no_clear() {
        let prev = UserFilters::default();
        let next = UserFilters {
            role: Some(UserRole::Admin),
            ..prev.clone()
        };
        let mut state: SelectionState<i64> = SelectionState::new();
        assert!(!state.on_filters_changed(&prev, &next));
    }

    // -- active filter count ----------------------------------------------

    #[test]
    fn active_filter_count_ignores_paging() {
        let filters = UserFilters {
            page: 4,
            limit: 100,
            sort_order: SortOrder::Asc,
            ..UserFilters::default()
        };
        assert_eq!(filters.active_filter_count(), 0);
    }

    #[test]
    fn active_filter_count_counts_each_set_field() {
        let filters = UserFilters {
            search: Some("ana".into()),
            role: Some(UserRole::Coach),
            min_sessions: Some(3),
            created_from: NaiveDate::from_ymd_opt(2026, 1, 1),
            ..UserFilters::default()
        };
        assert_eq!(filters.active_filter_count(), 4);
    }

    // -- normalization ----------------------------------------------------

    #[test]
    fn normalized_unsets_blank_text() {
        let filters = UserFilters {
            search: Some("   ".into()),
            country: Some(" FR ".into()),
            ..UserFilters::default()
        }
        .normalized();
        assert_eq!(filters.search, None);
        assert_eq!(filters.country.as_deref(), Some("FR"));
    }

    // -- validation -------------------------------------------------------

    #[test]
    fn default_filters_are_valid() {
        assert!(UserFilters::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_page_and_large_limit() {
        let zero_page = UserFilters { page: 0, ..UserFilters::default() };
        assert_matches!(zero_page.validate(), Err(CoreError::Validation(_)));

        let big_limit = UserFilters { limit: 500, ..UserFilters::default() };
        assert_matches!(big_limit.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn validate_rejects_inverted_ranges() {
        let filters = UserFilters {
            min_sessions: Some(10),
            max_sessions: Some(2),
            ..UserFilters::default()
        };
        assert_matches!(filters.validate(), Err(CoreError::Validation(msg)) if msg.contains("sessions"));
    }

    #[test]
    fn validate_rejects_out_of_scale_rating() {
        let filters = UserFilters {
            max_rating: Some(7.0),
            ..UserFilters::default()
        };
        assert_matches!(filters.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn validate_rejects_dates_beyond_supported_years() {
        let filters = UserFilters {
            created_to: NaiveDate::from_ymd_opt(262_142, 12, 31),
            ..UserFilters::default()
        };
        assert_matches!(filters.validate(), Err(CoreError::Validation(msg)) if msg.contains("createdTo"));

        let filters = UserFilters {
            last_login_from: NaiveDate::from_ymd_opt(1066, 10, 14),
            ..UserFilters::default()
        };
        assert_matches!(filters.validate(), Err(CoreError::Validation(msg)) if msg.contains("lastLoginFrom"));
    }

    #[test]
    fn offset_follows_page_and_limit() {
        let filters = UserFilters { page: 3, limit: 25, ..UserFilters::default() };
        assert_eq!(filters.offset(), 50);
    }

    // -- wire format ------------------------------------------------------

    #[test]
    fn blank_fields_of_initial_filter_object_are_unset() {
        let filters: UserFilters = serde_json::from_str(
            r#"{"search":"","role":"","status":"","emailVerified":"","subscriptionStatus":"",
                "minSessions":"","maxRating":"","createdFrom":"","lastLoginTo":"","page":1}"#,
        )
        .unwrap();
        assert_eq!(filters.normalized(), UserFilters::default());
    }

    #[test]
    fn text_encoded_values_parse() {
        let filters: UserFilters = serde_json::from_str(
            r#"{"role":"coach","subscriptionStatus":"past_due","emailVerified":"true",
                "minSessions":"3","minRating":"4.5","createdFrom":"2026-01-01"}"#,
        )
        .unwrap();
        assert_eq!(filters.role, Some(UserRole::Coach));
        assert_eq!(filters.subscription_status, Some(SubscriptionStatus::PastDue));
        assert_eq!(filters.email_verified, Some(true));
        assert_eq!(filters.min_sessions, Some(3));
        assert_eq!(filters.min_rating, Some(4.5));
        assert_eq!(filters.created_from, NaiveDate::from_ymd_opt(2026, 1, 1));
    }

    #[test]
    fn unknown_role_name_is_rejected() {
        assert!(serde_json::from_str::<UserFilters>(r#"{"role":"owner"}"#).is_err());
        assert!("owner".parse::<UserRole>().is_err());
        assert_eq!("coach".parse::<UserRole>().unwrap(), UserRole::Coach);
    }

    #[test]
    fn serializes_camel_case_and_iso_dates() {
        let filters = UserFilters {
            sort_field: UserSortField::LastLoginAt,
            created_from: NaiveDate::from_ymd_opt(2026, 2, 3),
            subscription_status: Some(SubscriptionStatus::PastDue),
            ..UserFilters::default()
        };
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json["sortField"], "lastLoginAt");
        assert_eq!(json["sortOrder"], "desc");
        assert_eq!(json["createdFrom"], "2026-02-03");
        assert_eq!(json["subscriptionStatus"], "past_due");
        assert!(json.get("search").is_none());
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let filters: UserFilters = serde_json::from_str(r#"{"role":"coach"}"#).unwrap();
        assert_eq!(filters.page, 1);
        assert_eq!(filters.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(filters.role, Some(UserRole::Coach));
    }
}
