//! User management tab.
//!
//! Holds the applied filter object, the current page and the selected
//! user. The selection is scoped to the result set: whenever the filtering
//! fields change, the selection and its detail panel are cleared. Paging
//! and sorting keep the selection.

use coachdesk_core::types::DbId;
use coachdesk_core::user_filters::{SelectionState, UserFilters};
use tokio::sync::mpsc;

use crate::api::{AdminUser, AdminUserDetail, ClientError, UserDirectory, UserPage};
use crate::notify::Notifier;

pub struct UserManagementTab<D, N> {
    directory: D,
    notifier: N,
    filters: UserFilters,
    selection: SelectionState<DbId>,
    detail: Option<AdminUserDetail>,
    page: Option<UserPage<AdminUser>>,
    countries: Vec<String>,
}

impl<D, N> UserManagementTab<D, N>
where
    D: UserDirectory,
    N: Notifier,
{
    pub fn new(directory: D, notifier: N) -> Self {
        Self {
            directory,
            notifier,
            filters: UserFilters::default(),
            selection: SelectionState::new(),
            detail: None,
            page: None,
            countries: Vec::new(),
        }
    }

    pub fn filters(&self) -> &UserFilters {
        &self.filters
    }

    pub fn selected_user(&self) -> Option<DbId> {
        self.selection.selected().copied()
    }

    pub fn detail(&self) -> Option<&AdminUserDetail> {
        self.detail.as_ref()
    }

    pub fn page(&self) -> Option<&UserPage<AdminUser>> {
        self.page.as_ref()
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// Replace the applied filters. Returns `true` if the selection was
    /// cleared.
    pub fn apply_filters(&mut self, next: UserFilters) -> bool {
        let cleared = self.selection.on_filters_changed(&self.filters, &next);
        if cleared {
            tracing::debug!("Filters changed, clearing selected user");
            self.detail = None;
        }
        self.filters = next;
        cleared
    }

    /// Apply every filter object the filter bar has propagated so far.
    ///
    /// Returns the number of updates applied.
    pub fn drain_filter_updates(&mut self, updates: &mut mpsc::UnboundedReceiver<UserFilters>) -> usize {
        let mut applied = 0;
        while let Ok(next) = updates.try_recv() {
            self.apply_filters(next);
            applied += 1;
        }
        applied
    }

    pub fn go_to_page(&mut self, page: u32) {
        let mut next = self.filters.clone();
        next.page = page.max(1);
        self.apply_filters(next);
    }

    /// Fetch the page for the applied filters.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        match self.directory.list_users(&self.filters).await {
            Ok(page) => {
                self.page = Some(page);
                Ok(())
            }
            Err(err) => {
                self.notifier.error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Load the distinct countries for the country dropdown.
    pub async fn load_countries(&mut self) -> Result<(), ClientError> {
        match self.directory.countries().await {
            Ok(countries) => {
                self.countries = countries;
                Ok(())
            }
            Err(err) => {
                self.notifier.error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Select a user and load the detail panel.
    pub async fn select_user(&mut self, id: DbId) -> Result<(), ClientError> {
        self.selection.select(id);
        self.detail = None;
        match self.directory.user_detail(id).await {
            Ok(detail) => {
                if self.selected_user() == Some(id) {
                    self.detail = Some(detail);
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(user_id = id, error = %err, "Failed to load user detail");
                self.notifier.error(&err.to_string());
                Err(err)
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.detail = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use coachdesk_core::user_filters::{SortOrder, UserRole};

    use super::*;
    use crate::filter_bar::FilterBar;
    use crate::notify::{RecordingNotifier, Toast};

    fn user(id: DbId) -> AdminUser {
        AdminUser {
            id,
            email: format!("user{id}@example.com"),
            first_name: "Test".to_string(),
            last_name: format!("User{id}"),
            role: "client".to_string(),
            status: "active".to_string(),
            email_verified: true,
            has_coach_profile: false,
            country: Some("DE".to_string()),
            subscription_status: "none".to_string(),
            sessions_count: 0,
            revenue_cents: 0,
            rating: None,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    struct FakeDirectory;

    #[async_trait]
    impl UserDirectory for FakeDirectory {
        async fn list_users(&self, filters: &UserFilters) -> Result<UserPage<AdminUser>, ClientError> {
            Ok(UserPage {
                items: vec![user(1), user(2)],
                total: 2,
                page: filters.page,
                limit: filters.limit,
            })
        }

        async fn user_detail(&self, id: DbId) -> Result<AdminUserDetail, ClientError> {
            if id == 404 {
                return Err(ClientError::Api {
                    status: 404,
                    message: "User with id 404 not found".to_string(),
                });
            }
            Ok(AdminUserDetail {
                user: user(id),
                recent_transactions: Vec::new(),
            })
        }

        async fn countries(&self) -> Result<Vec<String>, ClientError> {
            Ok(vec!["DE".to_string(), "FR".to_string()])
        }
    }

    fn tab() -> (UserManagementTab<FakeDirectory, Arc<RecordingNotifier>>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (UserManagementTab::new(FakeDirectory, Arc::clone(&notifier)), notifier)
    }

    #[tokio::test]
    async fn filter_change_clears_selection_and_detail() {
        let (mut tab, _) = tab();
        tab.select_user(7).await.unwrap();
        assert!(tab.detail().is_some());

        let next = UserFilters {
            role: Some(UserRole::Coach),
            ..UserFilters::default()
        };
        assert!(tab.apply_filters(next));
        assert_eq!(tab.selected_user(), None);
        assert!(tab.detail().is_none());
    }

    #[tokio::test]
    async fn paging_and_sorting_keep_selection() {
        let (mut tab, _) = tab();
        tab.select_user(7).await.unwrap();

        tab.go_to_page(3);
        let sorted = UserFilters {
            sort_order: SortOrder::Asc,
            ..tab.filters().clone()
        };
        assert!(!tab.apply_filters(sorted));

        assert_eq!(tab.selected_user(), Some(7));
        assert_eq!(tab.filters().page, 3);
    }

    #[tokio::test]
    async fn detail_error_becomes_toast() {
        let (mut tab, notifier) = tab();
        assert!(tab.select_user(404).await.is_err());
        assert!(tab.detail().is_none());
        assert_eq!(
            notifier.toasts(),
            vec![Toast::Error("User with id 404 not found".to_string())]
        );
    }

    #[tokio::test]
    async fn refresh_and_countries_populate_state() {
        let (mut tab, _) = tab();
        tab.refresh().await.unwrap();
        tab.load_countries().await.unwrap();
        assert_eq!(tab.page().unwrap().items.len(), 2);
        assert_eq!(tab.countries(), ["DE".to_string(), "FR".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_filter_bar_clears_selection_once_propagated() {
        let (mut tab, _) = tab();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut bar = FilterBar::new(tab.filters().clone(), tx);
        tab.select_user(5).await.unwrap();

        bar.set_search("ann");
        assert_eq!(tab.drain_filter_updates(&mut rx), 0);
        assert_eq!(tab.selected_user(), Some(5));

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(tab.drain_filter_updates(&mut rx), 1);
        assert_eq!(tab.selected_user(), None);
        assert_eq!(tab.filters().search.as_deref(), Some("ann"));
    }
}
