//! In-memory TTL cache for conversation listings.
//!
//! Entries are keyed by user, expire after a configurable time-to-live, and
//! are removed eagerly by `invalidate` when a write touches the user. The
//! clock is injected so expiry is testable without sleeping.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;

use crate::messaging::{
    domain::{ConversationSummary, UserId},
    error::CacheError,
    ports::cache::{CacheResult, ConversationCache},
};

/// Configuration for the conversation-listing cache.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// How long a cached listing stays valid.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(60),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    conversations: Vec<ConversationSummary>,
    inserted: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.inserted > ttl
    }
}

/// In-memory implementation of [`ConversationCache`].
///
/// # Example
///
/// ```
/// use missive::messaging::adapters::memory::{CacheConfig, InMemoryConversationCache};
/// use mockable::DefaultClock;
///
/// let cache = InMemoryConversationCache::new(CacheConfig::default(), DefaultClock);
/// assert_eq!(cache.entry_count(), 0);
/// ```
#[derive(Debug)]
pub struct InMemoryConversationCache<C: Clock> {
    entries: RwLock<HashMap<UserId, CacheEntry>>,
    config: CacheConfig,
    clock: C,
}

impl<C: Clock> InMemoryConversationCache<C> {
    /// Creates an empty cache with the given configuration and clock.
    #[must_use]
    pub fn new(config: CacheConfig, clock: C) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// Returns the number of cached entries, expired or not.
    ///
    /// Returns `0` if the internal lock is poisoned.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> ConversationCache for InMemoryConversationCache<C> {
    async fn get(&self, user: UserId) -> CacheResult<Option<Vec<ConversationSummary>>> {
        let now = self.clock.utc();
        let entries = self
            .entries
            .read()
            .map_err(|e| CacheError::unavailable(format!("lock poisoned: {e}")))?;

        Ok(entries
            .get(&user)
            .filter(|entry| !entry.is_expired(now, self.config.ttl))
            .map(|entry| entry.conversations.clone()))
    }

    async fn put(&self, user: UserId, conversations: &[ConversationSummary]) -> CacheResult<()> {
        let now = self.clock.utc();
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::unavailable(format!("lock poisoned: {e}")))?;

        // Expired entries are dropped opportunistically so the map does not
        // grow without bound.
        let ttl = self.config.ttl;
        entries.retain(|_, entry| !entry.is_expired(now, ttl));

        entries.insert(
            user,
            CacheEntry {
                conversations: conversations.to_vec(),
                inserted: now,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, user: UserId) -> CacheResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::unavailable(format!("lock poisoned: {e}")))?;
        entries.remove(&user);
        Ok(())
    }
}
