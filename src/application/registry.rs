//! Central registry for per-user request history.
//!
//! History is keyed by user. Each user entry holds one [`RequestHistory`] per
//! resource, so a single exclusive entry lock covers every count a global
//! scope check needs, while per-resource counts stay available.

use crate::application::ports::Storage;
use crate::domain::history::{RequestHistory, WindowStats};
use crate::domain::subject::{ResourceId, UserId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// All admission history of one user, split by resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserHistory {
    resources: HashMap<ResourceId, RequestHistory>,
}

impl UserHistory {
    /// Create an empty user history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prune every resource and drop the ones left empty.
    ///
    /// Returns the number of timestamps removed.
    pub fn prune(&mut self, now: Instant, max_window: Duration) -> usize {
        let mut removed = 0;
        self.resources.retain(|_, history| {
            removed += history.prune(now, max_window);
            !history.is_empty()
        });
        removed
    }

    /// Window stats for one resource, or across all resources when `resource`
    /// is `None`.
    pub fn window_stats(
        &self,
        resource: Option<&ResourceId>,
        now: Instant,
        window: Duration,
    ) -> WindowStats {
        match resource {
            Some(resource) => self
                .resources
                .get(resource)
                .map(|h| h.window_stats(now, window))
                .unwrap_or_else(WindowStats::empty),
            None => self
                .resources
                .values()
                .map(|h| h.window_stats(now, window))
                .fold(WindowStats::empty(), WindowStats::merge),
        }
    }

    /// Record an admission for a resource.
    pub fn record(&mut self, resource: &ResourceId, now: Instant) {
        self.resources
            .entry(resource.clone())
            .or_default()
            .record(now);
    }

    /// History of one resource, if any.
    pub fn resource(&self, resource: &ResourceId) -> Option<&RequestHistory> {
        self.resources.get(resource)
    }

    /// Number of resources with recorded history.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Total recorded admissions across resources.
    pub fn total_len(&self) -> usize {
        self.resources.values().map(RequestHistory::len).sum()
    }

    /// Check if no admissions are recorded.
    pub fn is_empty(&self) -> bool {
        self.resources.values().all(RequestHistory::is_empty)
    }
}

/// Registry managing all per-user history.
///
/// Uses the Storage port for concurrent access. Access to one user is
/// exclusive for the duration of the callback.
///
/// This type is generic over the storage implementation, allowing different
/// storage backends to be used. In production, use `Arc<ShardedStorage>`.
#[derive(Debug, Clone)]
pub struct HistoryRegistry<S>
where
    S: Storage<UserId, UserHistory>,
{
    storage: S,
}

impl<S> HistoryRegistry<S>
where
    S: Storage<UserId, UserHistory>,
{
    /// Create a new registry over a storage backend.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Exclusive access to a user's history, created empty if absent.
    ///
    /// If the history is empty once the callback returns, the user is
    /// dropped: an empty history behaves exactly like an absent one.
    pub fn with_user<F, R>(&self, user: &UserId, f: F) -> R
    where
        F: FnOnce(&mut UserHistory) -> R,
    {
        let result = self
            .storage
            .with_entry_mut(user.clone(), UserHistory::new, f);
        self.storage.remove_if(user, UserHistory::is_empty);
        result
    }

    /// Read a user's history without creating it.
    pub fn peek_user<F, R>(&self, user: &UserId, f: F) -> Option<R>
    where
        F: FnOnce(&UserHistory) -> R,
    {
        self.storage.with_existing(user, f)
    }

    /// Forget everything recorded for a user.
    pub fn remove_user(&self, user: &UserId) -> bool {
        self.storage.remove(user)
    }

    /// Prune every user and drop those left empty.
    ///
    /// With `max_window` of `None` nothing can be consulted any more, so all
    /// history is dropped. Returns the number of users dropped.
    pub fn prune_all(&self, now: Instant, max_window: Option<Duration>) -> usize {
        let mut dropped = 0;
        self.storage.retain(|_, history| {
            let keep = match max_window {
                Some(window) => {
                    history.prune(now, window);
                    !history.is_empty()
                }
                None => false,
            };
            if !keep {
                dropped += 1;
            }
            keep
        });
        dropped
    }

    /// Get the number of tracked users.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Clear all tracked state.
    pub fn clear(&self) {
        self.storage.clear();
    }
}
