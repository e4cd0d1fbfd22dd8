//! User directory service
//!
//! Owns the consistency rule between the record store and the cache: every
//! successful store operation is followed by an unconditional, best-effort
//! overwrite of the cache entries it affects. A store failure leaves the
//! cache untouched.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use userdir_core::cache::{with_timeout, WriteThrough};
use userdir_core::ports::{CacheStore, UserStore};
use userdir_core::{NewUser, Result, User};

pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn CacheStore>,
    timeout: Duration,
}

impl UserDirectory {
    /// `timeout` bounds cache calls and store reads. Inserts are not
    /// cancelled from here: dropping an in-flight insert can leave a
    /// committed row behind a reported failure, so the store bounds them
    /// itself (see `Database::new`).
    pub fn new(store: Arc<dyn UserStore>, cache: Arc<dyn CacheStore>, timeout: Duration) -> Self {
        Self {
            store,
            cache,
            timeout,
        }
    }

    #[cfg(test)]
    pub fn cache(&self) -> &dyn CacheStore {
        self.cache.as_ref()
    }

    fn write_through(&self) -> WriteThrough<'_> {
        WriteThrough::new(self.cache.as_ref(), self.timeout)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let users = with_timeout("store.list_users", self.timeout, self.store.list_users()).await?;

        self.write_through().users(&users).await;

        Ok(users)
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        debug!("Creating user: email={}", new_user.email);

        let user = self.store.create_user(&new_user).await?;

        info!("Created user {}", user.id);

        let writer = self.write_through();
        match with_timeout("store.list_users", self.timeout, self.store.list_users()).await {
            Ok(users) => writer.users(&users).await,
            Err(e) => warn!(
                "Skipping all_users refresh after creating user {}: {}",
                user.id, e
            ),
        }
        writer.user(&user).await;

        Ok(user)
    }
}
