use ::moka::future::Cache;
use ::moka::Expiry;
use async_trait::async_trait;
use kindling_core::TtlCache;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Entries carry their own TTL so one cache can hold values with different
/// freshness windows.
struct PerEntryTtl;

impl<V> Expiry<String, (V, Duration)> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &(V, Duration),
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.1)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &(V, Duration),
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // An overwrite restarts the new entry's window.
        Some(value.1)
    }
}

/// A TTL cache backed by Moka's concurrent in-memory cache.
///
/// Alternative to [`crate::MemoryTtlCache`] with a bounded capacity; expiry
/// is enforced by Moka's per-entry policy rather than an injected clock.
#[derive(Clone)]
pub struct MokaTtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    cache: Cache<String, (V, Duration)>,
}

impl<V> MokaTtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache with the default maximum capacity of 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    /// Creates a cache holding at most `max_capacity` entries.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }
}

impl<V> Default for MokaTtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> TtlCache<V> for MokaTtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        match self.cache.get(key).await {
            Some((value, _ttl)) => {
                debug!(key, "cache hit");
                Some(value)
            }
            None => {
                trace!(key, "cache miss");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: V, ttl: Duration) {
        self.cache.insert(key.to_string(), (value, ttl)).await;
        trace!(key, ttl = ?ttl, "cache store");
    }
}
