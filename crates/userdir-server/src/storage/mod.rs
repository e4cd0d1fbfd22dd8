//! Storage layer
//!
//! PostgreSQL holds the users table. The look-aside cache is Redis, or a
//! DashMap when `CACHE_BACKEND=memory`.

pub mod db;
pub mod memory;
pub mod redis;

pub use db::Database;
pub use memory::MemoryCache;
pub use self::redis::RedisCache;
