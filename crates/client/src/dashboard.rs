//! Overview tab controller.
//!
//! Owns the displayed widget layout and drives layout mutations with an
//! optimistic protocol:
//!
//! 1. cancel outstanding overview reads for the current query,
//! 2. snapshot the cached overview,
//! 3. write the expected preferences into the cache and the local layout,
//! 4. send the request,
//! 5. on success keep the optimistic state (closing the customization
//!    panel if the mutation came from it); on failure restore the snapshot
//!    and reset the local layout to the restored server value.
//!
//! Mutations are not sequenced. [`DashboardController::begin`] and
//! [`DashboardController::settle`] are public so a caller may overlap two
//! mutations; each failed one restores the snapshot it captured.

use std::sync::Arc;

use coachdesk_core::layout::{move_widget, position_of, EffectiveLayoutMemo, Layout, LayoutMutation};
use coachdesk_core::overview::{AdminOverview, OverviewQuery};
use coachdesk_core::query_cache::{QueryCache, Snapshot};
use coachdesk_core::widgets::{ResolvedWidget, WidgetKey, WidgetRegistry, WidgetSize};

use crate::api::{ClientError, OverviewSource, PreferenceStore};
use crate::notify::Notifier;

/// Cache of overview aggregates keyed by query.
pub type OverviewCache = QueryCache<OverviewQuery, AdminOverview>;

/// Customization panel state. Edits in the panel touch only the working
/// copy until the panel is closed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    Open { baseline: Layout, working: Layout },
}

/// A mutation whose optimistic state has been applied but which has not
/// settled yet.
#[derive(Debug)]
pub struct PendingMutation {
    query: OverviewQuery,
    snapshot: Snapshot<AdminOverview>,
    mutation: LayoutMutation,
}

impl PendingMutation {
    pub fn mutation(&self) -> &LayoutMutation {
        &self.mutation
    }
}

/// How a user action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Nothing changed, no request was sent.
    Skipped,
    Saved,
    RolledBack,
}

pub struct DashboardController<S, N> {
    store: S,
    notifier: N,
    cache: Arc<OverviewCache>,
    registry: Arc<WidgetRegistry>,
    query: OverviewQuery,
    memo: EffectiveLayoutMemo,
    local: Layout,
    panel: PanelState,
}

impl<S, N> DashboardController<S, N>
where
    S: PreferenceStore,
    N: Notifier,
{
    pub fn new(
        store: S,
        notifier: N,
        cache: Arc<OverviewCache>,
        registry: Arc<WidgetRegistry>,
        query: OverviewQuery,
    ) -> Self {
        let mut controller = Self {
            store,
            notifier,
            cache,
            registry,
            query,
            memo: EffectiveLayoutMemo::new(),
            local: Layout::new(),
            panel: PanelState::Closed,
        };
        controller.refresh_local();
        controller
    }

    pub fn query(&self) -> &OverviewQuery {
        &self.query
    }

    pub fn cache(&self) -> &Arc<OverviewCache> {
        &self.cache
    }

    /// Layout currently on screen.
    pub fn layout(&self) -> &Layout {
        &self.local
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn is_panel_open(&self) -> bool {
        matches!(self.panel, PanelState::Open { .. })
    }

    /// Cached overview for the current query.
    pub fn overview(&self) -> Option<Arc<AdminOverview>> {
        self.cache.get(&self.query).map(|entry| entry.value)
    }

    /// Layout derived from the cached server data.
    ///
    /// Returns the same `Arc` until the cached value changes.
    pub fn effective_layout(&mut self) -> Arc<Layout> {
        let entry = self.cache.get(&self.query);
        self.memo.resolve(
            entry.as_ref().map(|e| e.version),
            entry
                .as_ref()
                .and_then(|e| e.value.dashboard_preferences.as_deref()),
            &self.registry,
        )
    }

    /// Switch to another timeframe or date range.
    pub fn set_query(&mut self, query: OverviewQuery) {
        if query != self.query {
            self.query = query;
            self.refresh_local();
        }
    }

    /// Fetch the overview for the current query into the cache.
    ///
    /// A fetch overtaken by a mutation is discarded. Errors are reported
    /// through the notifier.
    pub async fn load<O>(&mut self, source: &O) -> Result<(), ClientError>
    where
        O: OverviewSource + ?Sized,
    {
        let ticket = self.cache.begin_fetch(&self.query);
        match source.fetch_overview(&self.query).await {
            Ok(overview) => {
                if !self.cache.complete_fetch(ticket, overview) {
                    tracing::debug!("Discarded overview fetch overtaken by a layout change");
                }
                self.refresh_local();
                Ok(())
            }
            Err(err) => {
                self.notifier.error(&err.to_string());
                Err(err)
            }
        }
    }

    // ---- mutations ----

    /// Drag-and-drop reorder of the displayed layout.
    pub async fn reorder(&mut self, from: usize, to: usize) -> MutationOutcome {
        let moved = move_widget(&self.local, from, to);
        if moved == self.local {
            return MutationOutcome::Skipped;
        }
        self.apply(LayoutMutation::Reorder(moved)).await
    }

    /// Restore registry defaults.
    pub async fn reset(&mut self) -> MutationOutcome {
        self.apply(LayoutMutation::Reset).await
    }

    /// Apply a mutation optimistically. The caller must pass the returned
    /// value to [`settle`](Self::settle) once the request finished.
    pub fn begin(&mut self, mutation: LayoutMutation) -> PendingMutation {
        self.cache.cancel_fetches(&self.query);
        let snapshot = self.cache.snapshot(&self.query);

        let cached = mutation.cached_preferences(&self.registry);
        self.cache
            .update(&self.query, move |overview| overview.with_preferences(Some(cached)));
        self.local = mutation.optimistic_layout(&self.registry);

        tracing::debug!(mutation = mutation.label(), "Applied optimistic layout");
        PendingMutation {
            query: self.query.clone(),
            snapshot,
            mutation,
        }
    }

    /// Send a pending mutation to the server.
    pub async fn send(&self, pending: &PendingMutation) -> Result<(), ClientError> {
        let payload = pending.mutation.payload();
        self.store.save_preferences(payload.as_deref()).await
    }

    /// Finish a mutation with the result of its request.
    pub fn settle(&mut self, pending: PendingMutation, result: Result<(), ClientError>) -> MutationOutcome {
        let PendingMutation {
            query,
            snapshot,
            mutation,
        } = pending;

        match result {
            Ok(()) => {
                tracing::info!(mutation = mutation.label(), "Dashboard layout saved");
                self.notifier.success(mutation.success_message());
                if mutation.from_panel() {
                    self.panel = PanelState::Closed;
                }
                MutationOutcome::Saved
            }
            Err(err) => {
                tracing::warn!(
                    mutation = mutation.label(),
                    error = %err,
                    "Dashboard layout change failed, rolling back",
                );
                self.cache.rollback(query, snapshot);
                self.refresh_local();
                if let PanelState::Open { baseline, working } = &mut self.panel {
                    *baseline = self.local.clone();
                    *working = self.local.clone();
                }
                self.notifier.error(&err.to_string());
                MutationOutcome::RolledBack
            }
        }
    }

    async fn apply(&mut self, mutation: LayoutMutation) -> MutationOutcome {
        let pending = self.begin(mutation);
        let result = self.send(&pending).await;
        self.settle(pending, result)
    }

    // ---- customization panel ----

    pub fn open_panel(&mut self) {
        self.panel = PanelState::Open {
            baseline: self.local.clone(),
            working: self.local.clone(),
        };
    }

    /// Flip a widget's visibility in the panel's working copy.
    pub fn toggle_widget(&mut self, key: WidgetKey) -> bool {
        self.edit_working(key, |widget| widget.enabled = !widget.enabled)
    }

    pub fn resize_widget(&mut self, key: WidgetKey, size: WidgetSize) -> bool {
        self.edit_working(key, |widget| widget.size = size)
    }

    /// Move a widget within the panel's working copy.
    pub fn move_in_panel(&mut self, from: usize, to: usize) -> bool {
        match &mut self.panel {
            PanelState::Open { working, .. } => {
                *working = move_widget(working, from, to);
                true
            }
            PanelState::Closed => false,
        }
    }

    /// Close the panel, saving the working copy if it was edited.
    ///
    /// On failure the panel stays open with its working copy reset.
    pub async fn close_panel(&mut self) -> MutationOutcome {
        let edited = match &self.panel {
            PanelState::Open { baseline, working } if baseline != working => Some(working.clone()),
            _ => None,
        };
        let Some(working) = edited else {
            self.panel = PanelState::Closed;
            return MutationOutcome::Skipped;
        };
        self.apply(LayoutMutation::Save(working)).await
    }

    /// Close the panel without saving.
    pub fn discard_panel(&mut self) {
        self.panel = PanelState::Closed;
    }

    fn edit_working<F>(&mut self, key: WidgetKey, f: F) -> bool
    where
        F: FnOnce(&mut ResolvedWidget),
    {
        let PanelState::Open { working, .. } = &mut self.panel else {
            return false;
        };
        match position_of(working, key) {
            Some(index) => {
                f(&mut working[index]);
                true
            }
            None => false,
        }
    }

    fn refresh_local(&mut self) {
        self.local = self.effective_layout().as_ref().clone();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use coachdesk_core::layout::{reconcile, reset_layout};
    use coachdesk_core::overview::Timeframe;
    use coachdesk_core::widgets::WidgetConfig;

    use super::*;
    use crate::notify::{RecordingNotifier, Toast};

    #[derive(Clone, Default)]
    struct FakeStore {
        calls: Arc<Mutex<Vec<Option<Vec<WidgetConfig>>>>>,
        failure: Arc<Mutex<Option<String>>>,
    }

    impl FakeStore {
        fn failing(message: &str) -> Self {
            let store = Self::default();
            *store.failure.lock().unwrap() = Some(message.to_string());
            store
        }

        fn calls(&self) -> Vec<Option<Vec<WidgetConfig>>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PreferenceStore for FakeStore {
        async fn save_preferences(&self, preferences: Option<&[WidgetConfig]>) -> Result<(), ClientError> {
            self.calls.lock().unwrap().push(preferences.map(<[WidgetConfig]>::to_vec));
            match self.failure.lock().unwrap().clone() {
                Some(message) => Err(ClientError::Api { status: 500, message }),
                None => Ok(()),
            }
        }
    }

    struct FixedSource(AdminOverview);

    #[async_trait]
    impl OverviewSource for FixedSource {
        async fn fetch_overview(&self, _query: &OverviewQuery) -> Result<AdminOverview, ClientError> {
            Ok(self.0.clone())
        }
    }

    fn stored() -> Vec<WidgetConfig> {
        vec![
            WidgetConfig::new(WidgetKey::Revenue, true, Some(WidgetSize::Full)),
            WidgetConfig::new(WidgetKey::UserGrowth, false, None),
        ]
    }

    fn setup(
        store: FakeStore,
        preferences: Option<Vec<WidgetConfig>>,
    ) -> (DashboardController<FakeStore, Arc<RecordingNotifier>>, Arc<RecordingNotifier>) {
        let cache = Arc::new(OverviewCache::new());
        let query = OverviewQuery::default();
        cache.set(
            query.clone(),
            AdminOverview {
                dashboard_preferences: preferences,
                ..AdminOverview::default()
            },
        );
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = DashboardController::new(
            store,
            Arc::clone(&notifier),
            cache,
            Arc::new(WidgetRegistry::standard()),
            query,
        );
        (controller, notifier)
    }

    fn cached_preferences(
        controller: &DashboardController<FakeStore, Arc<RecordingNotifier>>,
    ) -> Option<Vec<WidgetConfig>> {
        controller.overview().and_then(|o| o.dashboard_preferences.clone())
    }

    // -----------------------------------------------------------------------
    // Test: initial layout is reconciled from the cache
    // -----------------------------------------------------------------------

    #[test]
    fn initial_layout_comes_from_cached_preferences() {
        let (controller, _) = setup(FakeStore::default(), Some(stored()));
        let registry = WidgetRegistry::standard();
        assert_eq!(controller.layout(), &reconcile(Some(&stored()), &registry));
        assert_eq!(controller.layout()[0].key, WidgetKey::Revenue);
    }

    #[test]
    fn effective_layout_is_memoized_per_cache_version() {
        let (mut controller, _) = setup(FakeStore::default(), Some(stored()));
        let first = controller.effective_layout();
        let again = controller.effective_layout();
        assert!(Arc::ptr_eq(&first, &again));

        controller
            .cache()
            .update(&OverviewQuery::default(), |o| o.with_preferences(None));
        let changed = controller.effective_layout();
        assert!(!Arc::ptr_eq(&first, &changed));
    }

    // -----------------------------------------------------------------------
    // Test: reorder success keeps the optimistic state
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn reorder_success_keeps_optimistic_layout() {
        let store = FakeStore::default();
        let (mut controller, notifier) = setup(store.clone(), Some(stored()));
        let expected = move_widget(controller.layout(), 0, 2);

        let outcome = controller.reorder(0, 2).await;

        assert_eq!(outcome, MutationOutcome::Saved);
        assert_eq!(controller.layout(), &expected);
        let sent = store.calls();
        assert_eq!(sent.len(), 1);
        let payload = sent[0].clone().unwrap();
        assert_eq!(payload.len(), expected.len());
        assert!(payload.iter().all(|entry| entry.size.is_some()));
        assert_eq!(cached_preferences(&controller), Some(payload));
        assert_eq!(notifier.toasts(), vec![Toast::Success("Dashboard order saved".to_string())]);
    }

    #[tokio::test]
    async fn reorder_to_same_position_sends_nothing() {
        let store = FakeStore::default();
        let (mut controller, notifier) = setup(store.clone(), Some(stored()));
        assert_eq!(controller.reorder(1, 1).await, MutationOutcome::Skipped);
        assert!(store.calls().is_empty());
        assert!(notifier.toasts().is_empty());
    }

    // -----------------------------------------------------------------------
    // Test: failure restores cache and local state
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn failed_reorder_rolls_back_cache_and_layout() {
        let (mut controller, notifier) = setup(FakeStore::failing("Database unavailable"), Some(stored()));
        let before_layout = controller.layout().clone();
        let before_version = controller.cache().get(&OverviewQuery::default()).unwrap().version;

        let outcome = controller.reorder(0, 3).await;

        assert_eq!(outcome, MutationOutcome::RolledBack);
        assert_eq!(controller.layout(), &before_layout);
        let entry = controller.cache().get(&OverviewQuery::default()).unwrap();
        assert_eq!(entry.version, before_version);
        assert_eq!(entry.value.dashboard_preferences, Some(stored()));
        assert_eq!(notifier.toasts(), vec![Toast::Error("Database unavailable".to_string())]);
    }

    #[tokio::test]
    async fn failed_reset_restores_stored_preferences() {
        let (mut controller, _) = setup(FakeStore::failing("boom"), Some(stored()));
        assert_eq!(controller.reset().await, MutationOutcome::RolledBack);
        assert_eq!(cached_preferences(&controller), Some(stored()));
        assert_eq!(controller.layout()[0].key, WidgetKey::Revenue);
    }

    // -----------------------------------------------------------------------
    // Test: reset
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn reset_sends_null_and_caches_expanded_defaults() {
        let store = FakeStore::default();
        let (mut controller, notifier) = setup(store.clone(), Some(stored()));
        controller.open_panel();

        assert_eq!(controller.reset().await, MutationOutcome::Saved);

        assert_eq!(store.calls(), vec![None]);
        let registry = WidgetRegistry::standard();
        assert_eq!(controller.layout(), &reset_layout(&registry));
        let cached = cached_preferences(&controller).unwrap();
        assert_eq!(cached.len(), registry.len());
        assert!(cached.iter().all(|entry| entry.enabled));
        assert!(!controller.is_panel_open());
        assert_eq!(
            notifier.toasts(),
            vec![Toast::Success("Dashboard layout reset to defaults".to_string())]
        );
    }

    // -----------------------------------------------------------------------
    // Test: customization panel
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn panel_edits_are_local_until_closed() {
        let store = FakeStore::default();
        let (mut controller, _) = setup(store.clone(), None);
        let before = controller.layout().clone();

        controller.open_panel();
        assert!(controller.toggle_widget(WidgetKey::Sessions));
        assert!(controller.resize_widget(WidgetKey::Revenue, WidgetSize::Narrow));
        assert_eq!(controller.layout(), &before);
        assert!(store.calls().is_empty());

        assert_eq!(controller.close_panel().await, MutationOutcome::Saved);
        assert!(!controller.is_panel_open());
        let sessions = position_of(controller.layout(), WidgetKey::Sessions).unwrap();
        assert!(!controller.layout()[sessions].enabled);
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn closing_unchanged_panel_sends_nothing() {
        let store = FakeStore::default();
        let (mut controller, _) = setup(store.clone(), None);
        controller.open_panel();
        assert_eq!(controller.close_panel().await, MutationOutcome::Skipped);
        assert!(!controller.is_panel_open());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_panel_save_keeps_panel_open_with_server_layout() {
        let (mut controller, _) = setup(FakeStore::failing("nope"), None);
        controller.open_panel();
        controller.toggle_widget(WidgetKey::Revenue);

        assert_eq!(controller.close_panel().await, MutationOutcome::RolledBack);

        let expected = controller.layout().clone();
        assert_matches!(
            controller.panel(),
            PanelState::Open { baseline, working } if *baseline == expected && *working == expected
        );
    }

    #[test]
    fn panel_edits_require_open_panel() {
        let (mut controller, _) = setup(FakeStore::default(), None);
        assert!(!controller.toggle_widget(WidgetKey::Revenue));
        assert!(!controller.move_in_panel(0, 1));
    }

    // -----------------------------------------------------------------------
    // Test: concurrency with reads and other mutations
    // -----------------------------------------------------------------------

    #[test]
    fn mutation_discards_in_flight_fetch() {
        let (mut controller, _) = setup(FakeStore::default(), Some(stored()));
        let ticket = controller.cache().begin_fetch(&OverviewQuery::default());

        let moved = move_widget(controller.layout(), 0, 1);
        let pending = controller.begin(LayoutMutation::Reorder(moved.clone()));

        let stale = AdminOverview::default();
        assert!(!controller.cache().complete_fetch(ticket, stale));
        assert_eq!(controller.layout(), &moved);
        controller.settle(pending, Ok(()));
    }

    #[test]
    fn overlapping_failure_restores_its_own_snapshot() {
        let (mut controller, notifier) = setup(FakeStore::default(), Some(stored()));
        let server = controller.layout().clone();

        let first = controller.begin(LayoutMutation::Reorder(move_widget(&server, 0, 1)));
        let second_layout = move_widget(controller.layout(), 1, 2);
        let second = controller.begin(LayoutMutation::Reorder(second_layout));

        controller.settle(
            first,
            Err(ClientError::Api {
                status: 503,
                message: "unavailable".to_string(),
            }),
        );
        assert_eq!(controller.layout(), &server);

        assert_eq!(controller.settle(second, Ok(())), MutationOutcome::Saved);
        assert_eq!(controller.layout(), &server);
        assert_eq!(notifier.toasts().len(), 2);
    }

    #[tokio::test]
    async fn load_refreshes_layout_for_new_query() {
        let (mut controller, _) = setup(FakeStore::default(), None);
        controller.set_query(OverviewQuery::for_timeframe(Timeframe::Week));
        let source = FixedSource(AdminOverview {
            dashboard_preferences: Some(stored()),
            ..AdminOverview::default()
        });

        controller.load(&source).await.unwrap();

        assert_eq!(controller.layout()[0].key, WidgetKey::Revenue);
    }
}
