use crate::core::cache::Cache;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

#[derive(Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<SystemTime>,
}

/// Cache persisted in a fjall partition. Keys and entries are stored as JSON.
pub struct DiskCache<K, V> {
    keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskCache<K, V> {
    pub fn open(path: &Path, partition: &str) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create cache directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open cache keyspace at {}", path.display()))?;
        let handle = keyspace
            .open_partition(partition, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open cache partition: {partition}"))?;

        Ok(Self {
            keyspace,
            partition: handle,
            _marker: PhantomData,
        })
    }
}

impl<K, V> DiskCache<K, V>
where
    K: Serialize + Debug,
    V: Serialize + DeserializeOwned,
{
    fn read(&self, key: &K) -> Result<Option<V>> {
        let raw_key = serde_json::to_vec(key)?;
        let Some(raw) = self.partition.get(&raw_key)? else {
            debug!("Cache MISS for key: {:?}", key);
            return Ok(None);
        };

        let entry: CacheEntry<V> = serde_json::from_slice(&raw)?;
        if entry.expires_at.is_some_and(|at| SystemTime::now() >= at) {
            debug!("Cache entry expired for key: {:?}", key);
            self.partition.remove(raw_key)?;
            return Ok(None);
        }

        debug!("Cache HIT for key: {:?}", key);
        Ok(Some(entry.value))
    }

    fn write(&self, key: &K, value: V, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|d| SystemTime::now() + d);
        let entry = CacheEntry { value, expires_at };
        self.partition
            .insert(serde_json::to_vec(key)?, serde_json::to_vec(&entry)?)?;
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        debug!("Cache PUT for key: {:?}", key);
        Ok(())
    }

    fn delete(&self, key: &K) -> Result<()> {
        self.partition.remove(serde_json::to_vec(key)?)?;
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        let keys = self
            .partition
            .keys()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for key in keys {
            self.partition.remove(key)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<K, V>
where
    K: Eq + Hash + Send + Sync + Serialize + Debug + 'static,
    V: Send + Sync + Serialize + DeserializeOwned + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.read(key).unwrap_or_else(|e| {
            warn!("Cache read failed for key {:?}: {}", key, e);
            None
        })
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        if let Err(e) = self.write(&key, value, ttl) {
            warn!("Cache write failed for key {:?}: {}", key, e);
        }
    }

    async fn remove(&self, key: &K) {
        if let Err(e) = self.delete(key) {
            warn!("Cache remove failed for key {:?}: {}", key, e);
        }
    }

    async fn clear(&self) {
        if let Err(e) = self.delete_all() {
            warn!("Cache clear failed: {}", e);
        }
    }
}
