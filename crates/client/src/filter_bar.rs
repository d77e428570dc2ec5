//! Debounced filter bar for the user management table.
//!
//! The bar keeps its own copy of the filter object. Each edit restarts a
//! timer; the whole object is propagated to the parent only after the
//! timer runs out without further edits. Reset propagates immediately and
//! cancels any pending propagation.

use std::time::Duration;

use coachdesk_core::user_filters::{UserFilters, UserRole, UserStatus};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;

/// Delay between the last edit and propagation.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Delays values and forwards only the most recent one.
///
/// Scheduling a value cancels the previously scheduled one. Dropping the
/// debouncer cancels whatever is pending.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    sink: mpsc::UnboundedSender<T>,
    pending: Option<(CancellationToken, JoinHandle<()>)>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, sink: mpsc::UnboundedSender<T>) -> Self {
        Self {
            delay,
            sink,
            pending: None,
        }
    }

    /// Forward `value` after the delay unless something else is scheduled
    /// first. Must be called from within a Tokio runtime.
    pub fn schedule(&mut self, value: T) {
        self.cancel();

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let sink = self.sink.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if sink.send(value).is_err() {
                        tracing::debug!("Debounced value dropped, receiver gone");
                    }
                }
            }
        });
        self.pending = Some((cancel, handle));
    }

    /// Cancel the pending value and forward `value` right away.
    pub fn flush_now(&mut self, value: T) {
        self.cancel();
        if self.sink.send(value).is_err() {
            tracing::debug!("Value dropped, receiver gone");
        }
    }

    /// Cancel the pending value, if any.
    pub fn cancel(&mut self) {
        if let Some((cancel, _)) = self.pending.take() {
            cancel.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|(cancel, handle)| !cancel.is_cancelled() && !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some((cancel, _)) = self.pending.take() {
            cancel.cancel();
        }
    }
}

/// Local filter state with debounced propagation.
#[derive(Debug)]
pub struct FilterBar {
    filters: UserFilters,
    defaults: UserFilters,
    debouncer: Debouncer<UserFilters>,
}

impl FilterBar {
    /// Start from `initial`; reset returns to [`UserFilters::default`].
    pub fn new(initial: UserFilters, sink: mpsc::UnboundedSender<UserFilters>) -> Self {
        Self::with_delay(initial, sink, DEFAULT_DEBOUNCE)
    }

    /// Like [`FilterBar::new`] with the delay from
    /// `COACHDESK_FILTER_DEBOUNCE_MS`.
    pub fn from_config(
        initial: UserFilters,
        sink: mpsc::UnboundedSender<UserFilters>,
        config: &ClientConfig,
    ) -> Self {
        Self::with_delay(initial, sink, config.filter_debounce)
    }

    pub fn with_delay(initial: UserFilters, sink: mpsc::UnboundedSender<UserFilters>, delay: Duration) -> Self {
        Self {
            filters: initial,
            defaults: UserFilters::default(),
            debouncer: Debouncer::new(delay, sink),
        }
    }

    pub fn filters(&self) -> &UserFilters {
        &self.filters
    }

    /// Number of non-default filtering fields, for the badge.
    pub fn active_filter_count(&self) -> usize {
        self.filters.active_filter_count()
    }

    pub fn has_pending_changes(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Apply an arbitrary edit and restart the debounce timer.
    pub fn edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut UserFilters),
    {
        f(&mut self.filters);
        self.debouncer.schedule(self.filters.clone());
    }

    pub fn set_search(&mut self, search: &str) {
        let search = (!search.is_empty()).then(|| search.to_string());
        self.edit(|f| f.search = search);
    }

    pub fn set_role(&mut self, role: Option<UserRole>) {
        self.edit(|f| f.role = role);
    }

    pub fn set_status(&mut self, status: Option<UserStatus>) {
        self.edit(|f| f.status = status);
    }

    pub fn set_country(&mut self, country: Option<String>) {
        self.edit(|f| f.country = country);
    }

    /// Restore defaults and propagate immediately.
    pub fn reset(&mut self) {
        self.filters = self.defaults.clone();
        self.debouncer.flush_now(self.filters.clone());
    }
}
