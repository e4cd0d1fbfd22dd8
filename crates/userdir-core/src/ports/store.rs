//! Record store trait

use crate::Result;
use async_trait::async_trait;
use userdir_types::{NewUser, User};

/// Authoritative user storage
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Every stored user. Order is backend-defined.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Insert a user and return it with the identifier the store assigned.
    ///
    /// Identifiers must be assigned by the store itself so that concurrent
    /// inserts never compute the same value.
    async fn create_user(&self, user: &NewUser) -> Result<User>;
}
