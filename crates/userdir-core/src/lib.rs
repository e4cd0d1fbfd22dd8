//! userdir core library
//!
//! Error type, storage/cache port traits and the cache-consistency rules
//! shared by every userdir backend.

// Re-export pure types from userdir-types
pub use userdir_types::*;

pub mod cache;
pub mod error;
pub mod ports;

pub use cache::{CacheKey, CACHE_TTL};
pub use error::{Result, UserDirError};
