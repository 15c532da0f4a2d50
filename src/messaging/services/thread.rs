//! Thread reconstruction from the self-referential reply relation.
//!
//! Parent references are plain ids into the message arena, so a corrupted
//! chain can form a cycle. The resolver detects that instead of trusting
//! acyclicity.

use std::collections::HashSet;
use std::sync::Arc;

use crate::messaging::{
    domain::{Message, MessageId},
    error::{MessagingError, ThreadCorruption},
    ports::store::MessageStore,
};

/// Service reconstructing the full thread a message belongs to.
#[derive(Clone)]
pub struct ThreadResolver<S: MessageStore> {
    store: Arc<S>,
}

impl<S: MessageStore> ThreadResolver<S> {
    /// Creates a resolver over the given store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the deduplicated thread containing `message_id`, root first.
    ///
    /// The root is the message's parent when it has one, otherwise the
    /// message itself. Collection covers the root, its direct replies, and
    /// replies to those replies; the traversal is capped at two reply
    /// levels even though the data model permits deeper chains. Within the
    /// result, each direct reply is followed by its own replies; callers
    /// needing strict chronology sort by `created_at`.
    ///
    /// A message with no parent and no replies yields a singleton thread.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::MessageNotFound`] when `message_id` does
    /// not exist, and [`MessagingError::ThreadCorrupt`] when the parent
    /// chain is cyclic or references a missing message.
    pub async fn resolve(&self, message_id: MessageId) -> Result<Vec<Message>, MessagingError> {
        let message = self
            .store
            .find_message(message_id)
            .await?
            .ok_or(MessagingError::MessageNotFound(message_id))?;

        let root = self.resolve_root(&message).await?;

        let mut seen: HashSet<MessageId> = HashSet::from([root.id()]);
        let mut thread = vec![root.clone()];

        for direct in self.store.replies_to(root.id()).await? {
            let direct_id = direct.id();
            if !seen.insert(direct_id) {
                return Err(ThreadCorruption::Cycle(direct_id).into());
            }
            thread.push(direct);

            for indirect in self.store.replies_to(direct_id).await? {
                if !seen.insert(indirect.id()) {
                    return Err(ThreadCorruption::Cycle(indirect.id()).into());
                }
                thread.push(indirect);
            }
        }

        tracing::trace!(message = %message_id, size = thread.len(), "thread resolved");
        Ok(thread)
    }

    /// Identifies the thread root and rejects corrupt parent chains.
    async fn resolve_root(&self, message: &Message) -> Result<Message, MessagingError> {
        if message.parent() == Some(message.id()) {
            return Err(ThreadCorruption::SelfParent(message.id()).into());
        }

        let Some(parent_id) = message.parent() else {
            return Ok(message.clone());
        };

        let root = self
            .store
            .find_message(parent_id)
            .await?
            .ok_or(ThreadCorruption::DanglingParent {
                child: message.id(),
                parent: parent_id,
            })?;

        if root.parent() == Some(root.id()) {
            return Err(ThreadCorruption::SelfParent(root.id()).into());
        }
        if root.parent() == Some(message.id()) {
            return Err(ThreadCorruption::MutualParents(message.id(), root.id()).into());
        }
        Ok(root)
    }
}
