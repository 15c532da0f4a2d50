//! Mutation pipeline sequencing the side effects of message creation and
//! editing.
//!
//! The pipeline owns the derivation decisions: one notification per created
//! message when the endpoints differ, one history row per content-changing
//! edit. The store executes each decision as a single unit of work, so a
//! failure anywhere aborts the whole operation with no partial state.

use std::sync::Arc;

use mockable::Clock;

use crate::messaging::{
    domain::{ContentLimits, HistoryId, Message, MessageBody, MessageId, Notification, UserId},
    error::{MessagingError, StoreError},
    ports::{
        cache::ConversationCache,
        directory::UserDirectory,
        store::{EditOutcome, EditRecord, MessageStore},
    },
};

/// Parameters for sending a message through the pipeline.
#[derive(Debug, Clone)]
pub struct SendRequest<'a> {
    /// The sending user.
    pub sender: UserId,
    /// The receiving user.
    pub receiver: UserId,
    /// Raw body text, validated by the pipeline.
    pub text: &'a str,
    /// Optional message being replied to.
    pub parent: Option<MessageId>,
}

impl<'a> SendRequest<'a> {
    /// Creates a request for a new top-level message.
    #[must_use]
    pub const fn new(sender: UserId, receiver: UserId, text: &'a str) -> Self {
        Self {
            sender,
            receiver,
            text,
            parent: None,
        }
    }

    /// Marks the request as a reply to `parent`.
    #[must_use]
    pub const fn in_reply_to(mut self, parent: MessageId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Service for creating and editing messages with their derived entities.
///
/// # Example
///
/// ```ignore
/// use missive::messaging::services::{MessagePipeline, SendRequest};
///
/// let pipeline = MessagePipeline::new(store, cache, directory, clock);
/// let message = pipeline
///     .send_message(SendRequest::new(alice, bob, "hello"))
///     .await?;
/// pipeline.edit_message(message.id(), alice, "hello again").await?;
/// ```
#[derive(Clone)]
pub struct MessagePipeline<S, C, D, K>
where
    S: MessageStore,
    C: ConversationCache,
    D: UserDirectory,
    K: Clock + Send + Sync,
{
    store: Arc<S>,
    cache: Arc<C>,
    directory: Arc<D>,
    clock: Arc<K>,
    limits: ContentLimits,
}

impl<S, C, D, K> MessagePipeline<S, C, D, K>
where
    S: MessageStore,
    C: ConversationCache,
    D: UserDirectory,
    K: Clock + Send + Sync,
{
    /// Creates a pipeline with default content limits.
    #[must_use]
    pub fn new(store: Arc<S>, cache: Arc<C>, directory: Arc<D>, clock: Arc<K>) -> Self {
        Self {
            store,
            cache,
            directory,
            clock,
            limits: ContentLimits::default(),
        }
    }

    /// Overrides the content limits applied to bodies.
    #[must_use]
    pub const fn with_limits(mut self, limits: ContentLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Creates a message, deriving a notification for the receiver when the
    /// endpoints differ.
    ///
    /// The derivation decision uses creation-time data only and commits with
    /// the message in one unit.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::InvalidContent`] for empty or oversized
    /// text, [`MessagingError::UserNotFound`] when either endpoint does not
    /// resolve, [`MessagingError::MessageNotFound`] for a dangling parent
    /// reference, and [`MessagingError::Store`] on persistence failure.
    pub async fn send_message(&self, request: SendRequest<'_>) -> Result<Message, MessagingError> {
        let body = MessageBody::new(request.text, &self.limits)?;
        self.ensure_user(request.sender).await?;
        self.ensure_user(request.receiver).await?;

        let message = Message::new(
            request.sender,
            request.receiver,
            body,
            request.parent,
            self.clock.as_ref(),
        );

        // No self-notification: the check runs on creation-time data, never
        // re-queried, so it cannot race with later mutations.
        let notification = (request.sender != request.receiver)
            .then(|| Notification::new(request.receiver, message.id(), self.clock.as_ref()));

        self.store.create(&message, notification.as_ref()).await?;

        tracing::debug!(
            message = %message.id(),
            sender = %request.sender,
            receiver = %request.receiver,
            notified = notification.is_some(),
            "message created",
        );

        self.invalidate_participants(request.sender, request.receiver)
            .await;
        Ok(message)
    }

    /// Edits a message's body, appending a history row when the content
    /// actually changes.
    ///
    /// Ownership is a boundary concern enforced here, before the store is
    /// invoked: only the original sender may edit.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::InvalidContent`] for empty or oversized
    /// text, [`MessagingError::MessageNotFound`] when the message does not
    /// exist, [`MessagingError::PermissionDenied`] when the editor is not
    /// the sender, and [`MessagingError::Store`] on persistence failure.
    pub async fn edit_message(
        &self,
        message_id: MessageId,
        editor: UserId,
        text: &str,
    ) -> Result<EditOutcome, MessagingError> {
        let body = MessageBody::new(text, &self.limits)?;

        let current = self
            .store
            .find_message(message_id)
            .await?
            .ok_or(MessagingError::MessageNotFound(message_id))?;

        if current.sender() != editor {
            return Err(MessagingError::PermissionDenied {
                actor: editor,
                message: message_id,
            });
        }

        let outcome = self
            .store
            .apply_edit(EditRecord {
                message_id,
                editor,
                new_body: body,
                history_id: HistoryId::new(),
                edited_at: self.clock.utc(),
            })
            .await?;

        if outcome.changed() {
            tracing::debug!(message = %message_id, editor = %editor, "message edited");
            self.invalidate_participants(current.sender(), current.receiver())
                .await;
        }
        Ok(outcome)
    }

    async fn ensure_user(&self, user: UserId) -> Result<(), MessagingError> {
        let exists = self
            .directory
            .exists(user)
            .await
            .map_err(|e| MessagingError::Store(StoreError::connection(e.to_string())))?;
        if exists {
            Ok(())
        } else {
            Err(MessagingError::UserNotFound(user))
        }
    }

    /// Invalidates both participants' cached conversation listings.
    ///
    /// Cache failure is non-fatal; the entry expires by TTL instead.
    async fn invalidate_participants(&self, a: UserId, b: UserId) {
        let users = if a == b { vec![a] } else { vec![a, b] };
        for user in users {
            if let Err(e) = self.cache.invalidate(user).await {
                tracing::warn!(user = %user, error = %e, "conversation cache invalidation failed");
            }
        }
    }
}
