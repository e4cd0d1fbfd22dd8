//! Redis-backed look-aside cache

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use std::time::Duration;
use userdir_core::ports::CacheStore;
use userdir_core::UserDirError;

/// Cache client shared by every request.
///
/// `ConnectionManager` multiplexes one connection and reconnects on its own,
/// so clones are cheap and safe to use concurrently.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connect and verify the server answers PING
    pub async fn connect(host: &str, port: u16, password: Option<&str>, db: i64) -> Result<Self> {
        tracing::info!("Connecting to Redis at {}:{} (db {})", host, port, db);

        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(host.to_string(), port),
            redis: RedisConnectionInfo {
                db,
                username: None,
                password: password.map(str::to_string),
            },
        };

        let client = redis::Client::open(info).context("Invalid Redis connection info")?;
        let mut conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis did not answer PING")?;
        tracing::info!("Redis connection established ({})", pong);

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> userdir_core::Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> userdir_core::Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(&value[..])
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await
            .map_err(cache_error)
    }
}

fn cache_error(e: redis::RedisError) -> UserDirError {
    UserDirError::Cache(e.to_string())
}
