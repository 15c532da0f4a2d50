//! Notification records derived from message creation.

use super::{MessageId, NotificationId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A notification telling a user that a message arrived for them.
///
/// Exactly one notification exists per message when sender and receiver
/// differ; a self-addressed message produces none. After creation only the
/// `read` flag changes, and only at the owning user's request. Deletion
/// happens solely through cascades from the message or the user.
///
/// # Examples
///
/// ```
/// use missive::messaging::domain::{MessageId, Notification, UserId};
/// use mockable::DefaultClock;
///
/// let notification = Notification::new(UserId::new(), MessageId::new(), &DefaultClock);
/// assert!(!notification.read());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier for this notification.
    id: NotificationId,

    /// The user being notified.
    user: UserId,

    /// The message the notification refers to.
    message: MessageId,

    /// When the notification was created.
    created_at: DateTime<Utc>,

    /// Whether the owning user has read the notification.
    read: bool,
}

impl Notification {
    /// Creates a new unread notification stamped from the clock.
    #[must_use]
    pub fn new(user: UserId, message: MessageId, clock: &impl Clock) -> Self {
        Self {
            id: NotificationId::new(),
            user,
            message,
            created_at: clock.utc(),
            read: false,
        }
    }

    /// Rehydrates a notification from previously persisted state.
    #[must_use]
    pub const fn restore(
        id: NotificationId,
        user: UserId,
        message: MessageId,
        created_at: DateTime<Utc>,
        read: bool,
    ) -> Self {
        Self {
            id,
            user,
            message,
            created_at,
            read,
        }
    }

    /// Returns the notification identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the notified user reference.
    #[must_use]
    pub const fn user(&self) -> UserId {
        self.user
    }

    /// Returns the referenced message identifier.
    #[must_use]
    pub const fn message(&self) -> MessageId {
        self.message
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the owning user has read the notification.
    #[must_use]
    pub const fn read(&self) -> bool {
        self.read
    }

    /// Marks the notification as read.
    pub const fn mark_read(&mut self) {
        self.read = true;
    }
}
