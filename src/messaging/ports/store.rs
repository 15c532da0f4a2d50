//! Entity-store port for message, notification, and history persistence.
//!
//! Defines the abstract interface the mutation pipeline and read services
//! depend on, allowing different persistence implementations (`PostgreSQL`,
//! in-memory, etc.).

use crate::messaging::{
    domain::{
        HistoryId, Message, MessageBody, MessageHistory, MessageId, Notification, NotificationId,
        UserId,
    },
    error::StoreError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// An edit request handed to the store as one unit of work.
///
/// The caller pre-generates the identity and timestamp of the history row
/// that will materialise if the body actually changes. The store compares
/// against the stored body inside its per-row critical section, so two
/// concurrent edits can never both capture the same prior content.
#[derive(Debug, Clone)]
pub struct EditRecord {
    /// The message being edited.
    pub message_id: MessageId,
    /// The user making the edit.
    pub editor: UserId,
    /// The replacement body.
    pub new_body: MessageBody,
    /// Identity for the history row, should one be appended.
    pub history_id: HistoryId,
    /// Timestamp shared by the history row and the edit.
    pub edited_at: DateTime<Utc>,
}

/// Result of applying an [`EditRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The new body equalled the stored body; nothing was written.
    Unchanged(Message),
    /// The body changed; the history row was appended in the same unit.
    Edited {
        /// The message after the edit.
        message: Message,
        /// The appended history row capturing the prior body.
        history: MessageHistory,
    },
}

impl EditOutcome {
    /// Returns the message in its post-operation state.
    #[must_use]
    pub const fn message(&self) -> &Message {
        match self {
            Self::Unchanged(message) | Self::Edited { message, .. } => message,
        }
    }

    /// Returns `true` if the edit changed the stored body.
    #[must_use]
    pub const fn changed(&self) -> bool {
        matches!(self, Self::Edited { .. })
    }
}

/// Cascade summary returned by [`MessageStore::delete_user`].
///
/// `partners` lists the distinct other participants of the removed messages
/// so callers can invalidate their cached conversation listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Distinct conversation partners of the removed messages.
    pub partners: Vec<UserId>,
    /// Number of messages removed.
    pub messages_removed: usize,
    /// Number of notifications removed.
    pub notifications_removed: usize,
    /// Number of history rows removed.
    pub history_removed: usize,
}

impl PurgeReport {
    /// Returns `true` when the cascade removed nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages_removed == 0 && self.notifications_removed == 0 && self.history_removed == 0
    }
}

/// Port for message, notification, and history persistence.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - Each method is one all-or-nothing unit of work; an abandoned caller
///   never leaves partially-applied state.
/// - Operations on the same message id are serialised (no two concurrent
///   edits may both read the same prior body).
/// - Cascades never touch rows belonging exclusively to other users.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Stores a new message together with its derived notification, if any.
    ///
    /// The pair commits atomically: either both rows persist or neither
    /// does.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ParentNotFound`] when the message references a
    /// missing parent, [`StoreError::DuplicateMessage`] on id reuse, and
    /// backend variants on storage failure.
    async fn create(
        &self,
        message: &Message,
        notification: Option<&Notification>,
    ) -> StoreResult<()>;

    /// Applies an edit as one unit: compare, append history, update body.
    ///
    /// When the new body equals the stored body, nothing is written and the
    /// message's `edited` flag is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MessageNotFound`] when the message does not
    /// exist, and backend variants on storage failure.
    async fn apply_edit(&self, edit: EditRecord) -> StoreResult<EditOutcome>;

    /// Deletes a message, cascading to its notifications, history rows, and
    /// replies (transitively).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MessageNotFound`] when the message does not
    /// exist, and backend variants on storage failure.
    async fn delete_message(&self, id: MessageId) -> StoreResult<()>;

    /// Removes every entity owned by or referencing the user: messages they
    /// sent or received (with those messages' cascades), notifications
    /// addressed to them, and history rows they authored.
    ///
    /// Deleting a user with no data succeeds with an empty report.
    ///
    /// # Errors
    ///
    /// Returns backend variants on storage failure.
    async fn delete_user(&self, user: UserId) -> StoreResult<PurgeReport>;

    /// Retrieves a message by id. Returns `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns backend variants on storage failure.
    async fn find_message(&self, id: MessageId) -> StoreResult<Option<Message>>;

    /// Retrieves the direct replies to a message, oldest first.
    ///
    /// # Errors
    ///
    /// Returns backend variants on storage failure.
    async fn replies_to(&self, parent: MessageId) -> StoreResult<Vec<Message>>;

    /// Retrieves every message the user sent or received, newest first.
    ///
    /// # Errors
    ///
    /// Returns backend variants on storage failure.
    async fn messages_for_user(&self, user: UserId) -> StoreResult<Vec<Message>>;

    /// Retrieves the two-party history between `a` and `b`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns backend variants on storage failure.
    async fn messages_between(&self, a: UserId, b: UserId) -> StoreResult<Vec<Message>>;

    /// Retrieves unread messages addressed to the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns backend variants on storage failure.
    async fn unread_for(&self, user: UserId) -> StoreResult<Vec<Message>>;

    /// Retrieves a message's history rows, most recent edit first.
    ///
    /// # Errors
    ///
    /// Returns backend variants on storage failure.
    async fn history_for(&self, message: MessageId) -> StoreResult<Vec<MessageHistory>>;

    /// Retrieves the user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns backend variants on storage failure.
    async fn notifications_for(&self, user: UserId) -> StoreResult<Vec<Notification>>;

    /// Marks every unread message from `partner` to `user` as read.
    ///
    /// Returns the number of messages transitioned.
    ///
    /// # Errors
    ///
    /// Returns backend variants on storage failure.
    async fn mark_conversation_read(&self, user: UserId, partner: UserId) -> StoreResult<usize>;

    /// Marks the listed notifications as read, restricted to those owned by
    /// `user`.
    ///
    /// Returns the number of notifications transitioned.
    ///
    /// # Errors
    ///
    /// Returns backend variants on storage failure.
    async fn mark_notifications_read(
        &self,
        user: UserId,
        ids: &[NotificationId],
    ) -> StoreResult<usize>;
}
