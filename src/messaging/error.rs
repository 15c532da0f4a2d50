//! Error types for the messaging subsystem.
//!
//! Uses `thiserror` for typed variants that callers can inspect. Store and
//! cache failures carry their own types; [`MessagingError`] is the boundary
//! taxonomy services surface to callers.

use super::domain::{ContentError, MessageId, UserId};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur at the persistence boundary.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The referenced message does not exist.
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    /// The referenced parent message does not exist.
    #[error("parent message not found: {0}")]
    ParentNotFound(MessageId),

    /// A message with this ID already exists.
    #[error("duplicate message: {0}")]
    DuplicateMessage(MessageId),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(Arc<dyn std::error::Error + Send + Sync>),

    /// A serialisation error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A connection error occurred.
    #[error("connection error: {0}")]
    Connection(String),
}

impl StoreError {
    /// Creates a database error from any error type.
    #[must_use]
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Database(Arc::new(err))
    }

    /// Creates a serialisation error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        // Diesel constraint violations carry no row identity, so semantic
        // variants (ParentNotFound, DuplicateMessage) come from pre-checks in
        // the adapter rather than from this conversion.
        Self::database(err)
    }
}

/// Errors that can occur at the cache boundary.
///
/// Cache failures are never fatal: callers degrade to a miss and recompute.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The cache backend could not be reached.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Description of an inconsistent parent chain found during thread
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThreadCorruption {
    /// A message lists itself as its own parent.
    #[error("message {0} is its own parent")]
    SelfParent(MessageId),

    /// Two messages reference each other as parents.
    #[error("messages {0} and {1} are each other's parents")]
    MutualParents(MessageId, MessageId),

    /// A reply chain reached an already-visited message.
    #[error("cycle through message {0}")]
    Cycle(MessageId),

    /// A parent reference points at a message that no longer exists.
    #[error("message {child} references missing parent {parent}")]
    DanglingParent {
        /// The message holding the reference.
        child: MessageId,
        /// The missing parent.
        parent: MessageId,
    },
}

/// Boundary error taxonomy surfaced by the messaging services.
#[derive(Debug, Clone, Error)]
pub enum MessagingError {
    /// A referenced message does not exist.
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    /// A referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The actor lacks rights over the target message.
    #[error("user {actor} may not modify message {message}")]
    PermissionDenied {
        /// The user attempting the operation.
        actor: UserId,
        /// The message being modified.
        message: MessageId,
    },

    /// The supplied content failed validation.
    #[error(transparent)]
    InvalidContent(#[from] ContentError),

    /// The thread's parent chain is cyclic or inconsistent.
    #[error("thread corrupt: {0}")]
    ThreadCorrupt(#[from] ThreadCorruption),

    /// The persistence boundary failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for MessagingError {
    fn from(err: StoreError) -> Self {
        // Missing rows keep their identity across the boundary instead of
        // collapsing into an opaque store failure.
        match err {
            StoreError::MessageNotFound(id) | StoreError::ParentNotFound(id) => {
                Self::MessageNotFound(id)
            }
            other => Self::Store(other),
        }
    }
}
