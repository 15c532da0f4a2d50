//! Unread views and per-partner conversation summaries.
//!
//! Listings group a user's messages by "the other participant" and carry the
//! most recent message plus the unread count from that partner. Conversation
//! listings are cached per user; a failing cache degrades to computing live.

use std::sync::Arc;

use crate::messaging::{
    domain::{
        ConversationSummary, Message, MessageHistory, MessageId, Notification, NotificationId,
        UserId,
    },
    error::MessagingError,
    ports::{cache::ConversationCache, store::MessageStore},
};

/// Service computing unread and conversation read-models.
#[derive(Clone)]
pub struct InboxService<S, C>
where
    S: MessageStore,
    C: ConversationCache,
{
    store: Arc<S>,
    cache: Arc<C>,
}

impl<S, C> InboxService<S, C>
where
    S: MessageStore,
    C: ConversationCache,
{
    /// Creates an inbox service over the given store and cache.
    #[must_use]
    pub const fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        Self { store, cache }
    }

    /// Returns the number of unread messages addressed to the user.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Store`] on persistence failure.
    pub async fn unread_count_for(&self, user: UserId) -> Result<usize, MessagingError> {
        Ok(self.store.unread_for(user).await?.len())
    }

    /// Returns the unread messages addressed to the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Store`] on persistence failure.
    pub async fn unread_messages_for(&self, user: UserId) -> Result<Vec<Message>, MessagingError> {
        Ok(self.store.unread_for(user).await?)
    }

    /// Returns one summary per distinct conversation partner.
    ///
    /// Served from the cache when a fresh entry exists; otherwise computed
    /// from the store and cached. Cache failures are logged and treated as
    /// misses.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Store`] on persistence failure.
    pub async fn conversations_for(
        &self,
        user: UserId,
    ) -> Result<Vec<ConversationSummary>, MessagingError> {
        match self.cache.get(user).await {
            Ok(Some(cached)) => {
                tracing::trace!(user = %user, "conversation listing served from cache");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "conversation cache read failed");
            }
        }

        let conversations = self.compute_conversations(user).await?;

        if let Err(e) = self.cache.put(user, &conversations).await {
            tracing::warn!(user = %user, error = %e, "conversation cache write failed");
        }
        Ok(conversations)
    }

    /// Returns the two-party history between `user` and `partner`, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Store`] on persistence failure.
    pub async fn conversation_with(
        &self,
        user: UserId,
        partner: UserId,
    ) -> Result<Vec<Message>, MessagingError> {
        Ok(self.store.messages_between(user, partner).await?)
    }

    /// Marks every unread message from `partner` to `user` as read and
    /// returns the number transitioned.
    ///
    /// Both participants' cached listings are invalidated, since their
    /// summaries embed the affected messages.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Store`] on persistence failure.
    pub async fn mark_conversation_read(
        &self,
        user: UserId,
        partner: UserId,
    ) -> Result<usize, MessagingError> {
        let transitioned = self.store.mark_conversation_read(user, partner).await?;
        if transitioned > 0 {
            for affected in [user, partner] {
                if let Err(e) = self.cache.invalidate(affected).await {
                    tracing::warn!(
                        user = %affected,
                        error = %e,
                        "conversation cache invalidation failed",
                    );
                }
            }
        }
        Ok(transitioned)
    }

    /// Returns a message's edit history, most recent edit first.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::MessageNotFound`] when the message does not
    /// exist, and [`MessagingError::Store`] on persistence failure.
    pub async fn history_for(
        &self,
        message_id: MessageId,
    ) -> Result<Vec<MessageHistory>, MessagingError> {
        if self.store.find_message(message_id).await?.is_none() {
            return Err(MessagingError::MessageNotFound(message_id));
        }
        Ok(self.store.history_for(message_id).await?)
    }

    /// Returns the user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Store`] on persistence failure.
    pub async fn notifications_for(
        &self,
        user: UserId,
    ) -> Result<Vec<Notification>, MessagingError> {
        Ok(self.store.notifications_for(user).await?)
    }

    /// Marks the listed notifications as read, restricted to those the user
    /// owns, and returns the number transitioned.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Store`] on persistence failure.
    pub async fn mark_notifications_read(
        &self,
        user: UserId,
        ids: &[NotificationId],
    ) -> Result<usize, MessagingError> {
        Ok(self.store.mark_notifications_read(user, ids).await?)
    }

    /// Groups the user's messages into per-partner summaries.
    ///
    /// Messages arrive newest first, so the first message seen for a partner
    /// is the conversation's most recent one; partner order follows recency
    /// of that last message.
    async fn compute_conversations(
        &self,
        user: UserId,
    ) -> Result<Vec<ConversationSummary>, MessagingError> {
        let messages = self.store.messages_for_user(user).await?;
        let unread = self.store.unread_for(user).await?;

        let mut summaries: Vec<ConversationSummary> = Vec::new();
        for message in messages {
            let partner = message.partner_of(user);
            if summaries.iter().any(|s| s.partner() == partner) {
                continue;
            }
            let unread_from_partner = unread.iter().filter(|m| m.sender() == partner).count();
            summaries.push(ConversationSummary::new(partner, message, unread_from_partner));
        }
        Ok(summaries)
    }
}
