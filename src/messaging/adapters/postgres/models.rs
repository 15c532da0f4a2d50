//! Diesel model types for messaging persistence.
//!
//! Row structs map database rows to and from the domain layer. They are the
//! only place aware of both representations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{message_history, messages, notifications};
use crate::messaging::domain::{
    HistoryId, Message, MessageBody, MessageHistory, MessageId, Notification, NotificationId,
    RestoredMessage, UserId,
};

/// Database row representation of a message.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    /// Message identifier.
    pub id: Uuid,
    /// Sending user reference.
    pub sender: Uuid,
    /// Receiving user reference.
    pub receiver: Uuid,
    /// Current body text.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the receiver has read the message.
    pub read: bool,
    /// Whether the body has ever been changed.
    pub edited: bool,
    /// Optional parent message reference.
    pub parent_id: Option<Uuid>,
}

impl MessageRow {
    /// Converts the row into its domain representation.
    #[must_use]
    pub fn into_domain(self) -> Message {
        Message::restore(RestoredMessage {
            id: MessageId::from_uuid(self.id),
            sender: UserId::from_uuid(self.sender),
            receiver: UserId::from_uuid(self.receiver),
            body: MessageBody::from_stored(self.body),
            created_at: self.created_at,
            read: self.read,
            edited: self.edited,
            parent: self.parent_id.map(MessageId::from_uuid),
        })
    }
}

/// Data for inserting a new message.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessageRow {
    /// Message identifier.
    pub id: Uuid,
    /// Sending user reference.
    pub sender: Uuid,
    /// Receiving user reference.
    pub receiver: Uuid,
    /// Body text.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Read flag, `false` at creation.
    pub read: bool,
    /// Edited flag, `false` at creation.
    pub edited: bool,
    /// Optional parent message reference.
    pub parent_id: Option<Uuid>,
}

impl NewMessageRow {
    /// Creates an insertable row from a domain message.
    #[must_use]
    pub fn from_domain(message: &Message) -> Self {
        Self {
            id: message.id().into_inner(),
            sender: message.sender().into_inner(),
            receiver: message.receiver().into_inner(),
            body: message.body().as_str().to_owned(),
            created_at: message.created_at(),
            read: message.read(),
            edited: message.edited(),
            parent_id: message.parent().map(MessageId::into_inner),
        }
    }
}

/// Database row representation of a notification.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Notification identifier.
    pub id: Uuid,
    /// The notified user reference.
    pub user_id: Uuid,
    /// The referenced message.
    pub message_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the owning user has read the notification.
    pub read: bool,
}

impl NotificationRow {
    /// Converts the row into its domain representation.
    #[must_use]
    pub const fn into_domain(self) -> Notification {
        Notification::restore(
            NotificationId::from_uuid(self.id),
            UserId::from_uuid(self.user_id),
            MessageId::from_uuid(self.message_id),
            self.created_at,
            self.read,
        )
    }

    /// Creates an insertable row from a domain notification.
    #[must_use]
    pub fn from_domain(notification: &Notification) -> Self {
        Self {
            id: notification.id().into_inner(),
            user_id: notification.user().into_inner(),
            message_id: notification.message().into_inner(),
            created_at: notification.created_at(),
            read: notification.read(),
        }
    }
}

/// Database row representation of a history snapshot.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = message_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// History row identifier.
    pub id: Uuid,
    /// The owning message.
    pub message_id: Uuid,
    /// Body text before the edit.
    pub old_body: String,
    /// When the edit happened.
    pub edited_at: DateTime<Utc>,
    /// Who made the edit.
    pub edited_by: Uuid,
}

impl HistoryRow {
    /// Converts the row into its domain representation.
    #[must_use]
    pub fn into_domain(self) -> MessageHistory {
        MessageHistory::new(
            HistoryId::from_uuid(self.id),
            MessageId::from_uuid(self.message_id),
            MessageBody::from_stored(self.old_body),
            self.edited_at,
            UserId::from_uuid(self.edited_by),
        )
    }

    /// Creates an insertable row from a domain history snapshot.
    #[must_use]
    pub fn from_domain(history: &MessageHistory) -> Self {
        Self {
            id: history.id().into_inner(),
            message_id: history.message().into_inner(),
            old_body: history.old_body().as_str().to_owned(),
            edited_at: history.edited_at(),
            edited_by: history.edited_by().into_inner(),
        }
    }
}
