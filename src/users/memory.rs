//! In-memory user store.
//!
//! Useful for development and tests. Records live as long as the process.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::store::{NewUser, StoreError, User, UsersStore};

/// In-memory implementation of [`UsersStore`].
pub struct MemoryUsersStore {
    /// username -> user
    users: DashMap<String, User>,
    next_id: AtomicI64,
}

impl Default for MemoryUsersStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUsersStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Look up a user by username
    pub fn get(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|u| u.clone())
    }
}

#[async_trait]
impl UsersStore for MemoryUsersStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        // The entry holds the shard lock, so check-and-insert is atomic
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateUsername(user.username)),
            Entry::Vacant(slot) => {
                let record = User {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    username: user.username,
                    password_digest: user.password_digest,
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_first(&self) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .min_by_key(|entry| entry.value().id)
            .map(|entry| entry.value().clone()))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.users.len() as u64)
    }
}
