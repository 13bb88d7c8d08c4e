use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::{FeedError, Result};
use crate::cache::PersistentCache;

/// Process-local cache. Nothing survives a restart.
///
/// Reads and writes can be made to fail on demand, which is how the engine's
/// cache-failure paths are exercised.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|e| FeedError::Cache(format!("cache poisoned: {}", e)))
    }
}

#[async_trait]
impl PersistentCache for MemoryCache {
    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(FeedError::Cache("read failure".into()));
        }
        Ok(self.entries()?.get(name).cloned())
    }

    async fn set(&self, name: &str, value: &[u8]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FeedError::Cache("write failure".into()));
        }
        self.entries()?.insert(name.to_string(), value.to_vec());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FeedError::Cache("write failure".into()));
        }
        self.entries()?.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_remove() {
        let cache = MemoryCache::new();
        cache.set("k", b"value").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().unwrap(), b"value");

        cache.remove("k").await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let cache = MemoryCache::new();
        cache.set("k", b"value").await.unwrap();

        cache.fail_reads(true);
        assert!(cache.get("k").await.unwrap_err().is_cache_failure());
        cache.fail_reads(false);

        cache.fail_writes(true);
        assert!(cache.set("k", b"other").await.is_err());
        assert!(cache.remove("k").await.is_err());
        cache.fail_writes(false);

        // Failed writes left the old value in place
        assert_eq!(cache.get("k").await.unwrap().unwrap(), b"value");
    }
}
