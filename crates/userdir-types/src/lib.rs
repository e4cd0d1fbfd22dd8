//! userdir types - plain data shared by the store, the cache and the HTTP layer
//!
//! Nothing in here touches I/O. The serde shape of [`User`] is the wire
//! format for responses and the value format of every cache entry.

pub mod user;

pub use user::*;
