//! Append-only edit-history records for messages.

use super::{HistoryId, MessageBody, MessageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A snapshot of a message body taken immediately before an edit replaced it.
///
/// One row exists per content-changing edit. Rows are never mutated after
/// creation and are removed only when their message is deleted or their
/// editor's account is purged. Listings order rows by `edited_at` descending
/// so the most recent prior content comes first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageHistory {
    /// Unique identifier for this history row.
    id: HistoryId,

    /// The message the snapshot belongs to.
    message: MessageId,

    /// The body text as it was before the edit.
    old_body: MessageBody,

    /// When the edit happened.
    edited_at: DateTime<Utc>,

    /// The user who made the edit.
    edited_by: UserId,
}

impl MessageHistory {
    /// Creates a history row capturing `old_body` for `message`.
    ///
    /// The timestamp is supplied by the caller so that the row and the edit
    /// it records carry the same instant.
    #[must_use]
    pub const fn new(
        id: HistoryId,
        message: MessageId,
        old_body: MessageBody,
        edited_at: DateTime<Utc>,
        edited_by: UserId,
    ) -> Self {
        Self {
            id,
            message,
            old_body,
            edited_at,
            edited_by,
        }
    }

    /// Returns the history row identifier.
    #[must_use]
    pub const fn id(&self) -> HistoryId {
        self.id
    }

    /// Returns the owning message identifier.
    #[must_use]
    pub const fn message(&self) -> MessageId {
        self.message
    }

    /// Returns the body text as it was before the edit.
    #[must_use]
    pub const fn old_body(&self) -> &MessageBody {
        &self.old_body
    }

    /// Returns when the edit happened.
    #[must_use]
    pub const fn edited_at(&self) -> DateTime<Utc> {
        self.edited_at
    }

    /// Returns who made the edit.
    #[must_use]
    pub const fn edited_by(&self) -> UserId {
        self.edited_by
    }
}
