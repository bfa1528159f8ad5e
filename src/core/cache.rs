use async_trait::async_trait;
use std::time::Duration;

/// Key-value cache with optional per-entry time to live.
///
/// Implementations are best-effort: storage failures are logged and surface
/// as misses, never as errors to the caller.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;

    async fn put(&self, key: K, value: V, ttl: Option<Duration>);

    async fn remove(&self, key: &K);

    async fn clear(&self);
}
