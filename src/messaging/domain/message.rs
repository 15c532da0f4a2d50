//! The Message aggregate root for direct messages between two users.
//!
//! A message's identity, participants, parent reference, and creation
//! timestamp are fixed at construction. Only the read flag, the edited flag,
//! and the body change afterwards, and only through the entity store.

use super::{MessageBody, MessageId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A direct message from one user to another.
///
/// # Invariants
///
/// - `created_at` is set once from the injected clock and never changes.
/// - `parent`, if set, references an existing message (enforced by the
///   entity store at creation).
/// - `edited` is `true` iff at least one history row exists for this message;
///   the store flips it together with the history append.
///
/// # Examples
///
/// ```
/// use missive::messaging::domain::{ContentLimits, Message, MessageBody, UserId};
/// use mockable::DefaultClock;
///
/// let clock = DefaultClock;
/// let body = MessageBody::new("hi", &ContentLimits::default()).expect("valid body");
/// let message = Message::new(UserId::new(), UserId::new(), body, None, &clock);
///
/// assert!(!message.read());
/// assert!(!message.edited());
/// assert!(message.parent().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this message.
    id: MessageId,

    /// The sending user (weak reference, lookup only).
    sender: UserId,

    /// The receiving user (weak reference, lookup only).
    receiver: UserId,

    /// The current body text.
    body: MessageBody,

    /// When the message was created. Immutable.
    created_at: DateTime<Utc>,

    /// Whether the receiver has read the message.
    read: bool,

    /// Whether the body has ever been changed.
    edited: bool,

    /// The message this one replies to, if any.
    parent: Option<MessageId>,
}

impl Message {
    /// Creates a new unread, unedited message stamped from the clock.
    #[must_use]
    pub fn new(
        sender: UserId,
        receiver: UserId,
        body: MessageBody,
        parent: Option<MessageId>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            receiver,
            body,
            created_at: clock.utc(),
            read: false,
            edited: false,
            parent,
        }
    }

    /// Rehydrates a message from previously persisted state.
    ///
    /// Intended for adapters mapping storage rows back into the domain; it
    /// performs no validation beyond what the fields already encode.
    #[must_use]
    pub fn restore(parts: RestoredMessage) -> Self {
        Self {
            id: parts.id,
            sender: parts.sender,
            receiver: parts.receiver,
            body: parts.body,
            created_at: parts.created_at,
            read: parts.read,
            edited: parts.edited,
            parent: parts.parent,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the sending user reference.
    #[must_use]
    pub const fn sender(&self) -> UserId {
        self.sender
    }

    /// Returns the receiving user reference.
    #[must_use]
    pub const fn receiver(&self) -> UserId {
        self.receiver
    }

    /// Returns the current body text.
    #[must_use]
    pub const fn body(&self) -> &MessageBody {
        &self.body
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the receiver has read the message.
    #[must_use]
    pub const fn read(&self) -> bool {
        self.read
    }

    /// Returns whether the body has ever been changed.
    #[must_use]
    pub const fn edited(&self) -> bool {
        self.edited
    }

    /// Returns the parent message reference, if this is a reply.
    #[must_use]
    pub const fn parent(&self) -> Option<MessageId> {
        self.parent
    }

    /// Returns `true` when both endpoints are the given pair, in either
    /// direction.
    #[must_use]
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        (self.sender == a && self.receiver == b) || (self.sender == b && self.receiver == a)
    }

    /// Returns the other participant relative to `user`.
    ///
    /// For a self-addressed message the partner is the user themselves.
    #[must_use]
    pub fn partner_of(&self, user: UserId) -> UserId {
        if self.receiver == user {
            self.sender
        } else {
            self.receiver
        }
    }

    /// Marks the message as read by the receiver.
    pub const fn mark_read(&mut self) {
        self.read = true;
    }

    /// Replaces the body and records that an edit happened.
    ///
    /// Callers (the entity store) must append the matching history row in
    /// the same unit of work.
    pub fn apply_edit(&mut self, new_body: MessageBody) {
        self.body = new_body;
        self.edited = true;
    }
}

/// Persisted message state for [`Message::restore`].
#[derive(Debug, Clone)]
pub struct RestoredMessage {
    /// Unique identifier.
    pub id: MessageId,
    /// The sending user reference.
    pub sender: UserId,
    /// The receiving user reference.
    pub receiver: UserId,
    /// The current body text.
    pub body: MessageBody,
    /// The original creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the receiver has read the message.
    pub read: bool,
    /// Whether the body has ever been changed.
    pub edited: bool,
    /// The parent message reference, if any.
    pub parent: Option<MessageId>,
}
