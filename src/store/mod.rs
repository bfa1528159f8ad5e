pub mod disk;
pub mod memory;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::price::PricePoint;
use disk::DiskCache;
use memory::MemoryCache;
use std::sync::Arc;
use tracing::{debug, warn};

pub type PriceCache = Arc<dyn Cache<String, PricePoint>>;

const PRICE_PARTITION: &str = "prices";

/// Opens the price cache described by the config.
///
/// A persistent cache that cannot be opened degrades to an in-memory one; the
/// cache is never required for an allocation to succeed.
pub fn open_price_cache(config: &AppConfig) -> PriceCache {
    if !config.cache.persist {
        debug!("Using in-memory price cache");
        return Arc::new(MemoryCache::new());
    }

    let opened = config
        .data_path()
        .and_then(|path| DiskCache::open(&path.join("cache"), PRICE_PARTITION));

    match opened {
        Ok(cache) => {
            debug!("Using persistent price cache");
            Arc::new(cache)
        }
        Err(e) => {
            warn!("Falling back to in-memory price cache: {:#}", e);
            Arc::new(MemoryCache::new())
        }
    }
}
