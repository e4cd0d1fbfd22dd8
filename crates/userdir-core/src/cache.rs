//! Cache layout and write-through refresh
//!
//! Policy: cache-aside, write-through on mutation, no read-through on miss.
//! Two entry shapes share one keyspace and expire independently:
//!
//! - `all_users` holds a JSON array of every user
//! - `user:{id}` holds a single JSON user
//!
//! Cache writes are best-effort. A failed or slow write is logged and
//! dropped; it never fails the operation that triggered it.

use crate::ports::CacheStore;
use crate::{Result, UserDirError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use userdir_types::User;

/// Expiration applied to every entry
pub const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Snapshot of the whole users table
    AllUsers,
    /// Snapshot of one user
    User(i64),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::AllUsers => write!(f, "all_users"),
            CacheKey::User(id) => write!(f, "user:{}", id),
        }
    }
}

/// Run `fut` with an upper bound on its duration
pub async fn with_timeout<T, F>(operation: &'static str, timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(UserDirError::Timeout { operation, timeout }),
    }
}

/// Best-effort writer for the two entry shapes
#[derive(Clone, Copy)]
pub struct WriteThrough<'a> {
    cache: &'a dyn CacheStore,
    timeout: Duration,
}

impl<'a> WriteThrough<'a> {
    pub fn new(cache: &'a dyn CacheStore, timeout: Duration) -> Self {
        Self { cache, timeout }
    }

    /// Replace the collection snapshot
    pub async fn users(&self, users: &[User]) {
        self.put(CacheKey::AllUsers, users).await;
    }

    /// Replace the snapshot of a single user
    pub async fn user(&self, user: &User) {
        self.put(CacheKey::User(user.id), user).await;
    }

    async fn put<T: Serialize + ?Sized>(&self, key: CacheKey, value: &T) {
        let key = key.to_string();
        let result = match serde_json::to_vec(value) {
            Ok(bytes) => {
                with_timeout(
                    "cache.set",
                    self.timeout,
                    self.cache.set_with_ttl(&key, bytes, CACHE_TTL),
                )
                .await
            }
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => debug!("Refreshed cache entry {}", key),
            Err(e) => warn!("Ignoring cache write failure for {}: {}", key, e),
        }
    }
}

/// Read and decode a cache entry. Missing and expired entries are `None`.
pub async fn read_json<T: DeserializeOwned>(
    cache: &dyn CacheStore,
    key: CacheKey,
) -> Result<Option<T>> {
    match cache.get(&key.to_string()).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use userdir_types::NewUser;

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, (Vec<u8>, Duration)>>,
    }

    #[async_trait]
    impl CacheStore for MapCache {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone()))
        }

        async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value, ttl));
            Ok(())
        }
    }

    struct DownCache;

    #[async_trait]
    impl CacheStore for DownCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(UserDirError::Cache("connection refused".into()))
        }

        async fn set_with_ttl(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
            Err(UserDirError::Cache("connection refused".into()))
        }
    }

    struct StuckCache;

    #[async_trait]
    impl CacheStore for StuckCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            std::future::pending().await
        }

        async fn set_with_ttl(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(CacheKey::AllUsers.to_string(), "all_users");
        assert_eq!(CacheKey::User(4).to_string(), "user:4");
    }

    #[tokio::test]
    async fn test_write_through_sets_both_shapes_with_ttl() {
        let cache = MapCache::default();
        let dana = NewUser::new("Dana", "dana@x.com").with_id(4);
        let writer = WriteThrough::new(&cache, Duration::from_secs(1));

        writer.users(std::slice::from_ref(&dana)).await;
        writer.user(&dana).await;

        let all: Vec<User> = read_json(&cache, CacheKey::AllUsers).await.unwrap().unwrap();
        assert_eq!(all, vec![dana.clone()]);
        let one: User = read_json(&cache, CacheKey::User(4)).await.unwrap().unwrap();
        assert_eq!(one, dana);

        let entries = cache.entries.lock().unwrap();
        assert!(entries.values().all(|(_, ttl)| *ttl == CACHE_TTL));
    }

    #[tokio::test]
    async fn test_write_through_swallows_failures() {
        let writer = WriteThrough::new(&DownCache, Duration::from_secs(1));
        writer.users(&[]).await;
        writer
            .user(&NewUser::new("Ann", "ann@x.com").with_id(1))
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_through_gives_up_on_stuck_cache() {
        let writer = WriteThrough::new(&StuckCache, Duration::from_millis(50));
        writer.users(&[]).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_reports_operation() {
        let err = with_timeout("store.list_users", Duration::from_millis(10), async {
            std::future::pending::<Result<()>>().await
        })
        .await
        .unwrap_err();
        assert!(err.is_store_failure());
        assert!(err.to_string().contains("store.list_users"));
    }

    #[test]
    fn test_read_json_missing_entry() {
        let cache = MapCache::default();
        let entry: Option<User> =
            tokio_test::block_on(read_json(&cache, CacheKey::User(7))).unwrap();
        assert!(entry.is_none());
    }
}
