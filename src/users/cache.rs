//! TTL cache for resolved user identities.
//!
//! Entries are keyed by user ID or API key and hold non-authoritative
//! snapshots. Every identity mutation flushes the whole cache rather than
//! invalidating single keys; the hit-rate dip after a write is the price of
//! never serving a stale identity. The mutex makes a flush atomic with
//! respect to readers.

use cached::{Cached, stores::TimedCache};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::models::User;

pub struct UserCache {
    inner: Mutex<TimedCache<String, User>>,
}

impl UserCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(TimedCache::with_lifespan(ttl.as_secs())),
        }
    }

    pub fn get(&self, key: &str) -> Option<User> {
        self.lock().cache_get(key).cloned()
    }

    pub fn set(&self, key: String, user: User) {
        self.lock().cache_set(key, user);
    }

    /// Drop every entry, expired or not.
    pub fn flush(&self) {
        self.lock().cache_clear();
    }

    /// Evict entries whose TTL has passed. Called periodically by the
    /// janitor task; lookups never return expired entries either way.
    pub fn evict_expired(&self) {
        self.lock().flush();
    }

    pub fn len(&self) -> usize {
        self.lock().cache_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, TimedCache<String, User>> {
        // a poisoned lock still holds only disposable snapshots
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
