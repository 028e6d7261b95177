use async_trait::async_trait;
use dashmap::DashMap;
use jiff::Timestamp;
use kindling_core::{Clock, SystemClock, TtlCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

struct Entry<V> {
    value: V,
    expires_at: Timestamp,
}

/// An in-memory TTL cache over a lock-striped concurrent map.
///
/// Expiry is lazy: the read that finds an entry dead removes it, and there
/// is no background sweeper. Keys are bounded by the upstream catalog in
/// practice, so no eviction happens beyond TTL expiry.
///
/// Clones share the same underlying map, so one cache can be handed to any
/// number of concurrent tasks.
pub struct MemoryTtlCache<V, C = SystemClock> {
    entries: Arc<DashMap<String, Entry<V>>>,
    clock: C,
}

impl<V> MemoryTtlCache<V, SystemClock> {
    /// Creates a cache that measures expiry against the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<V> Default for MemoryTtlCache<V, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C: Clock> MemoryTtlCache<V, C> {
    /// Creates a cache that measures expiry against the given clock.
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Number of entries currently held, live or not yet reaped.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V, C: Clone> Clone for MemoryTtlCache<V, C> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            clock: self.clock.clone(),
        }
    }
}

#[async_trait]
impl<V, C> TtlCache<V> for MemoryTtlCache<V, C>
where
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();

        // The shard guard must drop before `remove`, or the same shard
        // would deadlock.
        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => {
                debug!(key, "cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            debug!(key, "cache entry expired");
        } else {
            trace!(key, "cache miss");
        }
        None
    }

    async fn set(&self, key: &str, value: V, ttl: Duration) {
        let expires_at = self.clock.now().checked_add(ttl).unwrap_or(Timestamp::MAX);
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
        trace!(key, expires_at = %expires_at, "cache store");
    }
}
