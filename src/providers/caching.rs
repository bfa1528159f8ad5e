use crate::core::error::FetchError;
use crate::core::price::{MarketDataProvider, PricePoint};
use crate::store::PriceCache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Serves quotes from a shared cache, fetching through the inner provider on
/// a miss.
///
/// Lookups for the same symbol are serialized so that concurrent requests
/// trigger a single upstream fetch. Failures are never cached.
pub struct CachingProvider<P> {
    inner: P,
    cache: PriceCache,
    ttl: Duration,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<P: MarketDataProvider> CachingProvider<P> {
    pub fn new(inner: P, cache: PriceCache, ttl: Duration) -> Self {
        Self {
            inner,
            cache,
            ttl,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    async fn symbol_lock(&self, symbol: &str) -> Arc<Mutex<()>> {
        let mut locks = self.in_flight.lock().await;
        Arc::clone(locks.entry(symbol.to_string()).or_default())
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachingProvider<P> {
    async fn fetch_quote(&self, symbol: &str) -> Result<PricePoint, FetchError> {
        let lock = self.symbol_lock(symbol).await;
        let _guard = lock.lock().await;

        let key = symbol.to_string();
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Using cached data for {}", symbol);
            return Ok(cached);
        }

        let point = self.inner.fetch_quote(symbol).await?;
        self.cache.put(key, point.clone(), Some(self.ttl)).await;
        Ok(point)
    }
}
