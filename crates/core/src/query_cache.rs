//! Client-side query cache with snapshot and rollback.
//!
//! Holds the last-known server view per query key. Writers are unordered:
//! the last write wins. Optimistic mutations capture a [`Snapshot`] first
//! and restore it with [`QueryCache::rollback`] if the request fails.
//!
//! In-flight reads are tracked with a per-key fetch epoch. A read started
//! with [`QueryCache::begin_fetch`] only lands if no
//! [`QueryCache::cancel_fetches`] happened for that key in between, so a
//! slow fetch cannot overwrite an optimistic write.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

/// A cached value together with its write version.
///
/// Versions are unique per cache and strictly increase with every write,
/// so they identify a value for memoization purposes.
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub value: Arc<V>,
    pub version: u64,
}

impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            version: self.version,
        }
    }
}

/// Captured state of one key, for rollback.
#[derive(Debug)]
pub struct Snapshot<V>(Option<CacheEntry<V>>);

impl<V> Snapshot<V> {
    /// The captured value, if the key was populated.
    pub fn value(&self) -> Option<&Arc<V>> {
        self.0.as_ref().map(|e| &e.value)
    }

    pub fn version(&self) -> Option<u64> {
        self.0.as_ref().map(|e| e.version)
    }
}

impl<V> Clone for Snapshot<V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Token for an in-flight read.
#[derive(Debug, Clone)]
pub struct FetchTicket<K> {
    key: K,
    epoch: u64,
}

impl<K> FetchTicket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

struct Slot<V> {
    entry: Option<CacheEntry<V>>,
    fetch_epoch: u64,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            entry: None,
            fetch_epoch: 0,
        }
    }
}

struct Inner<K, V> {
    slots: HashMap<K, Slot<V>>,
    next_version: u64,
}

impl<K, V> Inner<K, V> {
    fn bump_version(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }
}

/// Thread-safe key/value cache of query results.
pub struct QueryCache<K, V> {
    inner: RwLock<Inner<K, V>>,
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                slots: HashMap::new(),
                next_version: 0,
            }),
        }
    }
}

impl<K, V> std::fmt::Debug for QueryCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache").finish_non_exhaustive()
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entry for `key`.
    pub fn get(&self, key: &K) -> Option<CacheEntry<V>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.slots.get(key).and_then(|s| s.entry.clone())
    }

    /// Store `value` under `key`, returning the new version.
    pub fn set(&self, key: K, value: V) -> u64 {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let version = inner.bump_version();
        inner.slots.entry(key).or_default().entry = Some(CacheEntry {
            value: Arc::new(value),
            version,
        });
        version
    }

    /// Replace the value under `key` with `f(current)`.
    ///
    /// Returns the new version, or `None` if the key is not populated.
    pub fn update<F>(&self, key: &K, f: F) -> Option<u64>
    where
        F: FnOnce(&V) -> V,
    {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let current = inner.slots.get(key)?.entry.as_ref()?.value.clone();
        let next = f(&current);
        let version = inner.bump_version();
        if let Some(slot) = inner.slots.get_mut(key) {
            slot.entry = Some(CacheEntry {
                value: Arc::new(next),
                version,
            });
        }
        Some(version)
    }

    /// Capture the current state of `key`.
    pub fn snapshot(&self, key: &K) -> Snapshot<V> {
        Snapshot(self.get(key))
    }

    /// Restore `key` to a previously captured snapshot. A snapshot of an
    /// empty key removes whatever was written since.
    pub fn rollback(&self, key: K, snapshot: Snapshot<V>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.slots.entry(key).or_default().entry = snapshot.0;
    }

    /// Drop the cached value for `key`. Outstanding fetches still land.
    pub fn invalidate(&self, key: &K) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = inner.slots.get_mut(key) {
            slot.entry = None;
        }
    }

    /// Register an in-flight read for `key`.
    pub fn begin_fetch(&self, key: &K) -> FetchTicket<K> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let epoch = inner.slots.entry(key.clone()).or_default().fetch_epoch;
        FetchTicket {
            key: key.clone(),
            epoch,
        }
    }

    /// Store the result of a read unless it was cancelled meanwhile.
    ///
    /// Returns `true` if the value was written.
    pub fn complete_fetch(&self, ticket: FetchTicket<K>, value: V) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let current_epoch = inner
            .slots
            .get(&ticket.key)
            .map(|s| s.fetch_epoch)
            .unwrap_or_default();
        if current_epoch != ticket.epoch {
            return false;
        }
        let version = inner.bump_version();
        inner.slots.entry(ticket.key).or_default().entry = Some(CacheEntry {
            value: Arc::new(value),
            version,
        });
        true
    }

    /// Cancel every outstanding read for `key`.
    pub fn cancel_fetches(&self, key: &K) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let slot = inner.slots.entry(key.clone()).or_default();
        slot.fetch_epoch += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
