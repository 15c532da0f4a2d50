//! In-memory implementation of the [`UserDirectory`] port.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::messaging::{
    domain::UserId,
    ports::directory::{DirectoryError, DirectoryResult, UserDirectory},
};

/// In-memory user directory for tests and embedding.
///
/// # Example
///
/// ```
/// use missive::messaging::adapters::memory::InMemoryUserDirectory;
/// use missive::messaging::domain::UserId;
///
/// let directory = InMemoryUserDirectory::new();
/// let user = UserId::new();
/// directory.register(user);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashSet<UserId>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user to the directory.
    pub fn register(&self, user: UserId) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user);
        }
    }

    /// Removes a user from the directory.
    pub fn unregister(&self, user: UserId) {
        if let Ok(mut users) = self.users.write() {
            users.remove(&user);
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn exists(&self, user: UserId) -> DirectoryResult<bool> {
        let users = self
            .users
            .read()
            .map_err(|e| DirectoryError::unavailable(format!("lock poisoned: {e}")))?;
        Ok(users.contains(&user))
    }
}
