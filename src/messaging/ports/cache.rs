//! Cache port for conversation listings.
//!
//! Listings are cached per user with a short time-to-live. Writes touching a
//! user invalidate that user's entry eagerly; failures here are non-fatal
//! and callers degrade to computing live.

use crate::messaging::{
    domain::{ConversationSummary, UserId},
    error::CacheError,
};
use async_trait::async_trait;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Port for the per-user conversation-listing cache.
///
/// Implementations are keyed by user identity, mutated by `put` and
/// `invalidate` only, and may expire entries on their own schedule. Reads
/// tolerate staleness within the configured TTL; a write affecting a user
/// must be followed by `invalidate` for that user before the writer returns.
#[async_trait]
pub trait ConversationCache: Send + Sync {
    /// Returns the cached listing for the user, if present and fresh.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot be reached.
    async fn get(&self, user: UserId) -> CacheResult<Option<Vec<ConversationSummary>>>;

    /// Stores the listing for the user.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot be reached.
    async fn put(&self, user: UserId, conversations: &[ConversationSummary]) -> CacheResult<()>;

    /// Removes the user's cached listing, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot be reached.
    async fn invalidate(&self, user: UserId) -> CacheResult<()>;
}
