pub mod caching;
pub mod retrying;
pub mod tiingo;
pub mod util;
pub mod yahoo_finance;

use crate::core::config::{AppConfig, ProviderKind};
use crate::core::price::MarketDataProvider;
use crate::store::PriceCache;
use anyhow::Result;
use caching::CachingProvider;
use retrying::{Pacer, RetryingProvider};
use std::sync::Arc;
use tiingo::TiingoProvider;
use tracing::warn;
use util::RetryPolicy;
use yahoo_finance::YahooFinanceProvider;

fn with_fetch_stack<P: MarketDataProvider + 'static>(
    adapter: P,
    config: &AppConfig,
    cache: PriceCache,
) -> Arc<dyn MarketDataProvider> {
    let pacer = Arc::new(Pacer::new(config.request_pacing()));
    let retrying = RetryingProvider::new(adapter, RetryPolicy::from(&config.retry), pacer);
    Arc::new(CachingProvider::new(retrying, cache, config.cache.ttl()))
}

/// Builds the provider stack: cache, then retry with pacing, then the
/// configured market data adapter.
pub fn build_provider(
    config: &AppConfig,
    cache: PriceCache,
) -> Result<Arc<dyn MarketDataProvider>> {
    let timeout = config.request_timeout();
    let provider = match config.provider {
        ProviderKind::Tiingo => {
            if config.providers.tiingo.api_key.is_none() {
                warn!("No Tiingo API key configured; requests will likely be rejected");
            }
            with_fetch_stack(
                TiingoProvider::new(&config.providers.tiingo, timeout)?,
                config,
                cache,
            )
        }
        ProviderKind::Yahoo => with_fetch_stack(
            YahooFinanceProvider::new(&config.providers.yahoo, timeout)?,
            config,
            cache,
        ),
    };
    Ok(provider)
}
