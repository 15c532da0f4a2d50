//! Account purge orchestration.

use std::sync::Arc;

use crate::messaging::{
    domain::UserId,
    error::MessagingError,
    ports::{
        cache::ConversationCache,
        store::{MessageStore, PurgeReport},
    },
};

/// Service cascading the deletion of a user's messaging data.
#[derive(Clone)]
pub struct AccountPurge<S, C>
where
    S: MessageStore,
    C: ConversationCache,
{
    store: Arc<S>,
    cache: Arc<C>,
}

impl<S, C> AccountPurge<S, C>
where
    S: MessageStore,
    C: ConversationCache,
{
    /// Creates a purge service over the given store and cache.
    #[must_use]
    pub const fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        Self { store, cache }
    }

    /// Removes everything the user owns or authored and invalidates the
    /// cached listings of the user and every affected partner.
    ///
    /// Idempotent: purging a user with no remaining data succeeds with an
    /// empty report.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Store`] on persistence failure.
    pub async fn purge(&self, user: UserId) -> Result<PurgeReport, MessagingError> {
        let report = self.store.delete_user(user).await?;

        for affected in std::iter::once(user).chain(report.partners.iter().copied()) {
            if let Err(e) = self.cache.invalidate(affected).await {
                tracing::warn!(
                    user = %affected,
                    error = %e,
                    "conversation cache invalidation failed",
                );
            }
        }

        tracing::info!(
            user = %user,
            messages = report.messages_removed,
            notifications = report.notifications_removed,
            history = report.history_removed,
            "account purged",
        );
        Ok(report)
    }
}
