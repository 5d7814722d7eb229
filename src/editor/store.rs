//! Draft store
//!
//! This module provides a session-keyed store for drafts and other working
//! copies. Every operation is atomic per key, so concurrent interactions for
//! the same session can't create two drafts. Memory is bounded by an
//! [`EvictionPolicy`].

use crate::editor::custom_id::SessionKey;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// When entries are dropped from a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    /// Entries untouched for this long are expired
    pub idle_ttl: Option<Duration>,
    /// Upper bound on entries, least recently touched go first
    pub max_entries: Option<usize>,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self {
            idle_ttl: Some(Duration::minutes(30)),
            max_entries: None,
        }
    }
}

impl EvictionPolicy {
    /// Never evict
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            idle_ttl: None,
            max_entries: None,
        }
    }

    /// Expire entries after `idle_ttl` without a touch
    #[must_use]
    pub const fn idle(idle_ttl: Duration) -> Self {
        Self {
            idle_ttl: Some(idle_ttl),
            max_entries: None,
        }
    }

    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    fn is_expired(&self, touched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.idle_ttl.is_some_and(|ttl| now - touched_at >= ttl)
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    touched_at: DateTime<Utc>,
}

impl<T> Entry<T> {
    fn new(value: T, now: DateTime<Utc>) -> Self {
        Self {
            value,
            touched_at: now,
        }
    }
}

/// Session-keyed store of working copies
#[derive(Clone)]
pub struct DraftStore<T> {
    /// Name used in logs
    name: &'static str,
    entries: Arc<DashMap<SessionKey, Entry<T>>>,
    policy: EvictionPolicy,
}

impl<T> std::fmt::Debug for DraftStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftStore")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> DraftStore<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    /// Create an empty store
    #[must_use]
    pub fn new(name: &'static str, policy: EvictionPolicy) -> Self {
        Self {
            name,
            entries: Arc::new(DashMap::new()),
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Current value for a session, `None` when absent or expired
    #[must_use]
    pub fn get(&self, key: &SessionKey) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    /// Current value for a session, creating a default one if needed
    pub fn get_or_create(&self, key: &SessionKey) -> T {
        self.update_at(key, Utc::now(), |_| {})
    }

    /// Mutate the value for a session in place, creating it if needed.
    ///
    /// `f` runs while the entry is locked; it must not block.
    pub fn update(&self, key: &SessionKey, f: impl FnOnce(&mut T)) -> T {
        self.update_at(key, Utc::now(), f)
    }

    /// Current value for a session, storing `value` only when there is none.
    ///
    /// An entry another task created in the meantime wins over `value`.
    pub fn get_or_insert(&self, key: &SessionKey, value: T) -> T {
        self.upsert_at(key, Utc::now(), || value, |_| {})
    }

    /// Replace the value for a session outright
    pub fn insert(&self, key: SessionKey, value: T) {
        self.entries.insert(key, Entry::new(value, Utc::now()));
        self.enforce_capacity(&key);
    }

    /// Drop the value for a session; no-op when absent
    pub fn delete(&self, key: &SessionKey) {
        if self.entries.remove(key).is_some() {
            debug!(store = self.name, session = %key, "Draft deleted");
        }
    }

    /// Replace the value for a session with a fresh default
    pub fn reset(&self, key: &SessionKey) -> T {
        self.delete(key);
        self.get_or_create(key)
    }

    #[must_use]
    pub fn contains(&self, key: &SessionKey) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry idle past the policy's TTL, returns how many went
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        if self.policy.idle_ttl.is_none() {
            return 0;
        }
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !self.policy.is_expired(entry.touched_at, now));
        before.saturating_sub(self.entries.len())
    }

    /// Periodically evict expired entries until the runtime shuts down
    #[must_use]
    pub fn spawn_sweeper(&self, every: std::time::Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            info!(
                "Starting {} sweeper with {}s interval",
                store.name,
                every.as_secs()
            );
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let evicted = store.evict_expired(Utc::now());
                if evicted > 0 {
                    info!(
                        store = store.name,
                        evicted,
                        remaining = store.len(),
                        "Evicted idle drafts"
                    );
                }
            }
        })
    }

    fn get_at(&self, key: &SessionKey, now: DateTime<Utc>) -> Option<T> {
        if let Some(entry) = self.entries.get(key) {
            if !self.policy.is_expired(entry.touched_at, now) {
                return Some(entry.value.clone());
            }
        } else {
            return None;
        }

        self.entries
            .remove_if(key, |_, entry| self.policy.is_expired(entry.touched_at, now));
        None
    }

    fn update_at(&self, key: &SessionKey, now: DateTime<Utc>, f: impl FnOnce(&mut T)) -> T {
        self.upsert_at(key, now, T::default, f)
    }

    /// Mutate the live entry for `key`, creating it from `init` when absent
    /// or expired. `init` only runs when an entry is created.
    fn upsert_at(
        &self,
        key: &SessionKey,
        now: DateTime<Utc>,
        init: impl FnOnce() -> T,
        f: impl FnOnce(&mut T),
    ) -> T {
        let mut init = Some(init);
        let mut fresh = || Entry::new(init.take().map_or_else(T::default, |init| init()), now);
        let mut created = false;
        let snapshot = {
            let mut entry = self.entries.entry(*key).or_insert_with(|| {
                created = true;
                fresh()
            });
            if !created && self.policy.is_expired(entry.touched_at, now) {
                *entry = fresh();
                created = true;
            }
            f(&mut entry.value);
            entry.touched_at = now;
            entry.value.clone()
        };

        if created {
            debug!(store = self.name, session = %key, "Draft created");
            self.enforce_capacity(key);
        }
        snapshot
    }

    /// Drop least recently touched entries beyond `max_entries`, sparing `keep`
    fn enforce_capacity(&self, keep: &SessionKey) {
        let Some(max_entries) = self.policy.max_entries else {
            return;
        };

        while self.entries.len() > max_entries {
            let oldest = self
                .entries
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().touched_at)
                .map(|entry| *entry.key());

            let Some(oldest) = oldest else {
                break;
            };
            self.entries.remove(&oldest);
            debug!(store = self.name, session = %oldest, "Draft evicted over capacity");
        }
    }
}
