//! In-memory cache using DashMap (stands in for Redis on single-process runs)

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use userdir_core::ports::CacheStore;

/// Simple in-memory cache with TTL support
pub struct MemoryCache {
    data: Arc<DashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl MemoryCache {
    /// Must be called inside a Tokio runtime; spawns the expiry sweeper.
    pub fn new() -> Self {
        let cache = Self {
            data: Arc::new(DashMap::new()),
        };

        cache.start_cleanup_task();

        cache
    }

    /// Get a value from cache
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entry = self.data.get(key)?;
        if Instant::now() >= entry.expires_at {
            drop(entry);
            self.data.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Set a value with TTL, replacing any previous entry
    pub fn set_with_ttl(&self, key: String, value: Vec<u8>, ttl: Duration) {
        self.data.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn start_cleanup_task(&self) {
        let data = Arc::downgrade(&self.data);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;

                let Some(data) = data.upgrade() else {
                    break;
                };
                let now = Instant::now();
                data.retain(|_, entry| entry.expires_at > now);
            }
        });
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> userdir_core::Result<Option<Vec<u8>>> {
        Ok(MemoryCache::get(self, key))
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> userdir_core::Result<()> {
        MemoryCache::set_with_ttl(self, key.to_string(), value, ttl);
        Ok(())
    }
}
