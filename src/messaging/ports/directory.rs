//! Identity port resolving opaque user references.
//!
//! The messaging core makes no assumption about how user identities are
//! stored; it only needs to know whether a reference resolves.

use crate::messaging::domain::UserId;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors that can occur while resolving user references.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The identity provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl DirectoryError {
    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Port for the external identity provider.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns `true` if the reference resolves to a known user.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] if the provider cannot be reached.
    async fn exists(&self, user: UserId) -> DirectoryResult<bool>;
}
