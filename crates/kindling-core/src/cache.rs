use async_trait::async_trait;
use std::time::Duration;

/// A concurrency-safe key-value store with per-entry time-to-live.
///
/// Keys are opaque strings. An absent or expired key is a normal miss, not a
/// failure, so the API carries no error channel. Implementations may expire
/// lazily, but a read at or after an entry's expiry instant must behave as a
/// miss and never return stale data.
#[async_trait]
pub trait TtlCache<V>: Send + Sync + 'static
where
    V: Clone + Send + Sync + 'static,
{
    /// Returns the live value under `key`, or `None` on a miss.
    async fn get(&self, key: &str) -> Option<V>;

    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// Overwrites any live value under the same key and resets its expiry.
    async fn set(&self, key: &str, value: V, ttl: Duration);
}
