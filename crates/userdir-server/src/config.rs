//! Server configuration
//!
//! Values come from the process environment. A `.env` file in the working
//! directory is loaded first when present; a missing file is not an error.

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    /// In-process DashMap cache, for running without a Redis server
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL connection string
    pub postgres_dsn: String,

    #[serde(default = "default_redis_addr")]
    pub redis_addr: String,

    #[serde(default)]
    pub redis_password: Option<String>,

    #[serde(default)]
    pub redis_db: i64,

    #[serde(default)]
    pub cache_backend: CacheBackend,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

fn default_redis_addr() -> String {
    "127.0.0.1:6379".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_operation_timeout_ms() -> u64 {
    5000
}

impl ServerConfig {
    /// Load `.env` (if any) and read the process environment
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded .env from {}", path.display()),
            Err(e) => warn!("No .env file loaded: {}", e),
        }

        Self::from_env(Environment::default())
    }

    pub fn from_env(env: Environment) -> Result<Self> {
        let settings = Config::builder()
            .add_source(env)
            .build()
            .context("Failed to read configuration sources")?;

        let config: Self = settings
            .try_deserialize()
            .context("Invalid configuration")?;

        if config.operation_timeout_ms == 0 {
            anyhow::bail!("OPERATION_TIMEOUT_MS must be greater than zero");
        }

        Ok(config)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Redis password, treating an empty value as unset
    pub fn redis_password(&self) -> Option<&str> {
        self.redis_password.as_deref().filter(|p| !p.is_empty())
    }

    /// Split `REDIS_ADDR` into host and port
    pub fn redis_endpoint(&self) -> Result<(String, u16)> {
        let (host, port) = self
            .redis_addr
            .rsplit_once(':')
            .with_context(|| format!("REDIS_ADDR must be host:port, got {}", self.redis_addr))?;
        let port = port
            .parse()
            .with_context(|| format!("Invalid port in REDIS_ADDR: {}", self.redis_addr))?;
        Ok((host.to_string(), port))
    }
}
