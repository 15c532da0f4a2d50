//! Per-partner conversation summaries for inbox listings.

use super::{Message, UserId};
use serde::{Deserialize, Serialize};

/// Aggregate view of one conversation partner for a given user.
///
/// Carries the most recent message exchanged with the partner and the count
/// of unread messages that partner has sent. Produced by grouping a user's
/// messages by "the other participant" on each message.
///
/// # Examples
///
/// ```
/// use missive::messaging::domain::{
///     ContentLimits, ConversationSummary, Message, MessageBody, UserId,
/// };
/// use mockable::DefaultClock;
///
/// let alice = UserId::new();
/// let bob = UserId::new();
/// let body = MessageBody::new("hi", &ContentLimits::default()).expect("valid body");
/// let message = Message::new(alice, bob, body, None, &DefaultClock);
///
/// let summary = ConversationSummary::new(alice, message, 1);
/// assert_eq!(summary.unread_from_partner(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// The other participant in the conversation.
    partner: UserId,

    /// The most recent message exchanged with the partner.
    last_message: Message,

    /// Unread messages sent by the partner to the summarised user.
    unread_from_partner: usize,
}

impl ConversationSummary {
    /// Creates a conversation summary.
    #[must_use]
    pub const fn new(partner: UserId, last_message: Message, unread_from_partner: usize) -> Self {
        Self {
            partner,
            last_message,
            unread_from_partner,
        }
    }

    /// Returns the conversation partner.
    #[must_use]
    pub const fn partner(&self) -> UserId {
        self.partner
    }

    /// Returns the most recent message exchanged with the partner.
    #[must_use]
    pub const fn last_message(&self) -> &Message {
        &self.last_message
    }

    /// Returns the number of unread messages from the partner.
    #[must_use]
    pub const fn unread_from_partner(&self) -> usize {
        self.unread_from_partner
    }
}
