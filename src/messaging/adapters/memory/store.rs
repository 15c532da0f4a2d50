//! In-memory implementation of the [`MessageStore`] port.
//!
//! Keeps all three entity kinds in one arena behind a single [`RwLock`], so
//! every mutation is all-or-nothing and operations on the same message are
//! serialised by construction. Suitable for unit tests and embedding; not a
//! durable store.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::messaging::{
    domain::{
        HistoryId, Message, MessageHistory, MessageId, Notification, NotificationId, UserId,
    },
    error::StoreError,
    ports::store::{EditOutcome, EditRecord, MessageStore, PurgeReport, StoreResult},
};

/// Arena of all persisted entities, keyed by id with references as ids.
#[derive(Debug, Default)]
struct Arena {
    messages: HashMap<MessageId, Message>,
    notifications: HashMap<NotificationId, Notification>,
    history: HashMap<HistoryId, MessageHistory>,
}

impl Arena {
    /// Collects `root` and every transitive reply beneath it.
    fn cascade_set(&self, root: MessageId) -> HashSet<MessageId> {
        let mut doomed = HashSet::from([root]);
        loop {
            let next: Vec<MessageId> = self
                .messages
                .values()
                .filter(|m| m.parent().is_some_and(|p| doomed.contains(&p)))
                .map(Message::id)
                .filter(|id| !doomed.contains(id))
                .collect();
            if next.is_empty() {
                break;
            }
            doomed.extend(next);
        }
        doomed
    }

    /// Removes the given messages together with their notifications and
    /// history rows. Returns (messages, notifications, history) counts.
    fn remove_messages(&mut self, doomed: &HashSet<MessageId>) -> (usize, usize, usize) {
        let before_notifications = self.notifications.len();
        let before_history = self.history.len();
        let before_messages = self.messages.len();

        self.notifications.retain(|_, n| !doomed.contains(&n.message()));
        self.history.retain(|_, h| !doomed.contains(&h.message()));
        self.messages.retain(|id, _| !doomed.contains(id));

        (
            before_messages - self.messages.len(),
            before_notifications - self.notifications.len(),
            before_history - self.history.len(),
        )
    }
}

/// In-memory implementation of [`MessageStore`].
///
/// Thread-safe via an internal [`RwLock`]; clones share the same arena.
///
/// # Example
///
/// ```
/// use missive::messaging::adapters::memory::InMemoryMessageStore;
///
/// let store = InMemoryMessageStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryMessageStore {
    arena: Arc<RwLock<Arena>>,
}

impl InMemoryMessageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored messages.
    ///
    /// Returns `0` if the internal lock is poisoned, matching the fallback
    /// behaviour of an empty store.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.arena.read().map(|a| a.messages.len()).unwrap_or(0)
    }

    /// Returns the number of stored notifications.
    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.arena.read().map(|a| a.notifications.len()).unwrap_or(0)
    }

    /// Returns the number of stored history rows.
    #[must_use]
    pub fn history_count(&self) -> usize {
        self.arena.read().map(|a| a.history.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message_count() == 0 && self.notification_count() == 0 && self.history_count() == 0
    }

    fn read_arena(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Arena>> {
        self.arena
            .read()
            .map_err(|e| StoreError::connection(format!("lock poisoned: {e}")))
    }

    fn write_arena(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Arena>> {
        self.arena
            .write()
            .map_err(|e| StoreError::connection(format!("lock poisoned: {e}")))
    }
}

/// Sorts messages newest first, with the id as a stable tiebreaker.
fn newest_first(messages: &mut [Message]) {
    messages.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().into_inner().cmp(&a.id().into_inner()))
    });
}

/// Sorts messages oldest first, with the id as a stable tiebreaker.
fn oldest_first(messages: &mut [Message]) {
    messages.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().into_inner().cmp(&b.id().into_inner()))
    });
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create(
        &self,
        message: &Message,
        notification: Option<&Notification>,
    ) -> StoreResult<()> {
        let mut arena = self.write_arena()?;

        if arena.messages.contains_key(&message.id()) {
            return Err(StoreError::DuplicateMessage(message.id()));
        }
        if let Some(parent) = message.parent() {
            if !arena.messages.contains_key(&parent) {
                return Err(StoreError::ParentNotFound(parent));
            }
        }

        // Single write guard: the message and its notification land together
        // or not at all.
        arena.messages.insert(message.id(), message.clone());
        if let Some(n) = notification {
            arena.notifications.insert(n.id(), n.clone());
        }
        Ok(())
    }

    async fn apply_edit(&self, edit: EditRecord) -> StoreResult<EditOutcome> {
        let mut arena = self.write_arena()?;

        let old_body = {
            let current = arena
                .messages
                .get(&edit.message_id)
                .ok_or(StoreError::MessageNotFound(edit.message_id))?;

            if *current.body() == edit.new_body {
                return Ok(EditOutcome::Unchanged(current.clone()));
            }
            current.body().clone()
        };

        let history = MessageHistory::new(
            edit.history_id,
            edit.message_id,
            old_body,
            edit.edited_at,
            edit.editor,
        );

        // History lands before the new body becomes visible; both happen
        // under the same write guard.
        arena.history.insert(history.id(), history.clone());
        let message = arena
            .messages
            .get_mut(&edit.message_id)
            .ok_or(StoreError::MessageNotFound(edit.message_id))?;
        message.apply_edit(edit.new_body);

        Ok(EditOutcome::Edited {
            message: message.clone(),
            history,
        })
    }

    async fn delete_message(&self, id: MessageId) -> StoreResult<()> {
        let mut arena = self.write_arena()?;

        if !arena.messages.contains_key(&id) {
            return Err(StoreError::MessageNotFound(id));
        }

        let doomed = arena.cascade_set(id);
        arena.remove_messages(&doomed);
        Ok(())
    }

    async fn delete_user(&self, user: UserId) -> StoreResult<PurgeReport> {
        let mut arena = self.write_arena()?;

        // Partners are gathered from every message the user participated in,
        // before any row disappears, so callers can invalidate the listings
        // that mentioned this user.
        let mut partners: Vec<UserId> = Vec::new();
        for message in arena.messages.values() {
            if message.sender() == user || message.receiver() == user {
                let partner = message.partner_of(user);
                if partner != user && !partners.contains(&partner) {
                    partners.push(partner);
                }
            }
        }

        let doomed: HashSet<MessageId> = arena
            .messages
            .values()
            .filter(|m| m.sender() == user)
            .map(Message::id)
            .collect();

        let (messages_removed, mut notifications_removed, mut history_removed) =
            arena.remove_messages(&doomed);

        let before_notifications = arena.notifications.len();
        arena.notifications.retain(|_, n| n.user() != user);
        notifications_removed += before_notifications - arena.notifications.len();

        let before_history = arena.history.len();
        arena.history.retain(|_, h| h.edited_by() != user);
        history_removed += before_history - arena.history.len();

        Ok(PurgeReport {
            partners,
            messages_removed,
            notifications_removed,
            history_removed,
        })
    }

    async fn find_message(&self, id: MessageId) -> StoreResult<Option<Message>> {
        let arena = self.read_arena()?;
        Ok(arena.messages.get(&id).cloned())
    }

    async fn replies_to(&self, parent: MessageId) -> StoreResult<Vec<Message>> {
        let arena = self.read_arena()?;
        let mut replies: Vec<Message> = arena
            .messages
            .values()
            .filter(|m| m.parent() == Some(parent))
            .cloned()
            .collect();
        oldest_first(&mut replies);
        Ok(replies)
    }

    async fn messages_for_user(&self, user: UserId) -> StoreResult<Vec<Message>> {
        let arena = self.read_arena()?;
        let mut messages: Vec<Message> = arena
            .messages
            .values()
            .filter(|m| m.sender() == user || m.receiver() == user)
            .cloned()
            .collect();
        newest_first(&mut messages);
        Ok(messages)
    }

    async fn messages_between(&self, a: UserId, b: UserId) -> StoreResult<Vec<Message>> {
        let arena = self.read_arena()?;
        let mut messages: Vec<Message> = arena
            .messages
            .values()
            .filter(|m| m.is_between(a, b))
            .cloned()
            .collect();
        oldest_first(&mut messages);
        Ok(messages)
    }

    async fn unread_for(&self, user: UserId) -> StoreResult<Vec<Message>> {
        let arena = self.read_arena()?;
        let mut messages: Vec<Message> = arena
            .messages
            .values()
            .filter(|m| m.receiver() == user && !m.read())
            .cloned()
            .collect();
        newest_first(&mut messages);
        Ok(messages)
    }

    async fn history_for(&self, message: MessageId) -> StoreResult<Vec<MessageHistory>> {
        let arena = self.read_arena()?;
        let mut rows: Vec<MessageHistory> = arena
            .history
            .values()
            .filter(|h| h.message() == message)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.edited_at()
                .cmp(&a.edited_at())
                .then_with(|| b.id().into_inner().cmp(&a.id().into_inner()))
        });
        Ok(rows)
    }

    async fn notifications_for(&self, user: UserId) -> StoreResult<Vec<Notification>> {
        let arena = self.read_arena()?;
        let mut rows: Vec<Notification> = arena
            .notifications
            .values()
            .filter(|n| n.user() == user)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().into_inner().cmp(&a.id().into_inner()))
        });
        Ok(rows)
    }

    async fn mark_conversation_read(&self, user: UserId, partner: UserId) -> StoreResult<usize> {
        let mut arena = self.write_arena()?;
        let mut transitioned = 0;
        for message in arena.messages.values_mut() {
            if message.receiver() == user && message.sender() == partner && !message.read() {
                message.mark_read();
                transitioned += 1;
            }
        }
        Ok(transitioned)
    }

    async fn mark_notifications_read(
        &self,
        user: UserId,
        ids: &[NotificationId],
    ) -> StoreResult<usize> {
        let mut arena = self.write_arena()?;
        let mut transitioned = 0;
        for id in ids {
            if let Some(notification) = arena.notifications.get_mut(id) {
                if notification.user() == user && !notification.read() {
                    notification.mark_read();
                    transitioned += 1;
                }
            }
        }
        Ok(transitioned)
    }
}
