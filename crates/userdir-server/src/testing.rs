//! In-process doubles for the storage ports

use crate::storage::MemoryCache;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use userdir_core::ports::{CacheStore, UserStore};
use userdir_core::{NewUser, Result, User, UserDirError};

/// Users table in a Vec. Identifiers are assigned under the lock.
#[derive(Default)]
pub struct MemoryUserStore {
    users: tokio::sync::Mutex<Vec<User>>,
    calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
}

impl MemoryUserStore {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: tokio::sync::Mutex::new(users),
            ..Default::default()
        }
    }

    /// Number of store operations attempted so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list_users(&self) -> Result<Vec<User>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(UserDirError::Database("connection reset by peer".into()));
        }
        Ok(self.users.lock().await.clone())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(UserDirError::Database("connection reset by peer".into()));
        }

        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserDirError::Database(
                "duplicate key value violates unique constraint \"users_email_key\"".into(),
            ));
        }
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let created = user.clone().with_id(id);
        users.push(created.clone());
        Ok(created)
    }
}

/// Store whose calls never complete
pub struct StuckStore;

#[async_trait]
impl UserStore for StuckStore {
    async fn list_users(&self) -> Result<Vec<User>> {
        std::future::pending().await
    }

    async fn create_user(&self, _user: &NewUser) -> Result<User> {
        std::future::pending().await
    }
}

/// Commits inserts immediately but acknowledges them only after `delay`
pub struct SlowAckStore {
    inner: Arc<MemoryUserStore>,
    delay: Duration,
}

impl SlowAckStore {
    pub fn new(inner: Arc<MemoryUserStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl UserStore for SlowAckStore {
    async fn list_users(&self) -> Result<Vec<User>> {
        self.inner.list_users().await
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let created = self.inner.create_user(user).await?;
        tokio::time::sleep(self.delay).await;
        Ok(created)
    }
}

/// MemoryCache that remembers which keys were written
pub struct RecordingCache {
    inner: MemoryCache,
    writes: Mutex<Vec<String>>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self {
            inner: MemoryCache::new(),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheStore for RecordingCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.get(key))
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.writes.lock().unwrap().push(key.to_string());
        self.inner.set_with_ttl(key.to_string(), value, ttl);
        Ok(())
    }
}

/// Cache that is always unreachable
pub struct DownCache;

#[async_trait]
impl CacheStore for DownCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(UserDirError::Cache("connection refused".into()))
    }

    async fn set_with_ttl(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
        Err(UserDirError::Cache("connection refused".into()))
    }
}

pub fn user(id: i64, name: &str, email: &str) -> User {
    NewUser::new(name, email).with_id(id)
}
