//! userdir server
//!
//! HTTP front for the users table: `GET /allUsers` and `POST /user`.
//! PostgreSQL is the source of truth; Redis holds a look-aside copy that is
//! overwritten after every successful store operation.

mod config;
mod error;
mod handlers;
mod services;
mod storage;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use userdir_core::ports::CacheStore;

use crate::config::{CacheBackend, ServerConfig};
use crate::services::UserDirectory;
use crate::storage::{Database, MemoryCache, RedisCache};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<UserDirectory>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    if let Err(e) = init_tracing() {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting userdir server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` filters (default `info`); `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

async fn run_server() -> Result<()> {
    info!("Loading configuration...");
    let config = ServerConfig::load().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, cache={:?}, timeout={:?}",
        config.bind_address,
        config.cache_backend,
        config.operation_timeout()
    );

    let timeout = config.operation_timeout();

    let db = Arc::new(
        Database::new(&config.postgres_dsn, config.db_max_connections, timeout)
            .await
            .context("Failed to initialize database")?,
    );

    let cache: Arc<dyn CacheStore> = match config.cache_backend {
        CacheBackend::Redis => {
            let (host, port) = config.redis_endpoint()?;
            Arc::new(
                RedisCache::connect(&host, port, config.redis_password(), config.redis_db)
                    .await
                    .context("Failed to initialize Redis cache")?,
            )
        }
        CacheBackend::Memory => {
            info!("Using in-memory cache");
            Arc::new(MemoryCache::new())
        }
    };

    let state = AppState {
        directory: Arc::new(UserDirectory::new(db, cache, timeout)),
    };

    let app = build_router(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server ready to accept connections");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/allUsers", get(handlers::users::list))
        .route("/user", post(handlers::users::create))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
