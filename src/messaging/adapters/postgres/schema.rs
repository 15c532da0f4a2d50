//! Diesel schema for messaging persistence.
//!
//! Mirrors an externally-migrated schema; this crate performs no
//! migrations.

diesel::table! {
    /// Direct messages between users.
    messages (id) {
        /// Message identifier.
        id -> Uuid,
        /// Sending user reference.
        sender -> Uuid,
        /// Receiving user reference.
        receiver -> Uuid,
        /// Current body text.
        body -> Text,
        /// Creation timestamp. Never updated.
        created_at -> Timestamptz,
        /// Whether the receiver has read the message.
        read -> Bool,
        /// Whether the body has ever been changed.
        edited -> Bool,
        /// Optional parent message for replies.
        parent_id -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Notifications derived from message creation.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// The notified user reference.
        user_id -> Uuid,
        /// The referenced message.
        message_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Whether the owning user has read the notification.
        read -> Bool,
    }
}

diesel::table! {
    /// Append-only edit history snapshots.
    message_history (id) {
        /// History row identifier.
        id -> Uuid,
        /// The owning message.
        message_id -> Uuid,
        /// Body text before the edit.
        old_body -> Text,
        /// When the edit happened.
        edited_at -> Timestamptz,
        /// Who made the edit.
        edited_by -> Uuid,
    }
}

diesel::joinable!(notifications -> messages (message_id));
diesel::joinable!(message_history -> messages (message_id));

diesel::allow_tables_to_appear_in_same_query!(messages, notifications, message_history);
