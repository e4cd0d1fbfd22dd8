//! Look-aside cache trait

use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Key-value cache with per-entry expiration.
///
/// Implementations are non-authoritative: callers must tolerate every
/// operation failing.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrite `key`, replacing any previous value and expiration
    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
}
