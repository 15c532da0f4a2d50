//! Direct-messaging domain engine.
//!
//! This module manages direct messages between users, derives notifications
//! and edit-history records as side effects of message mutations,
//! reconstructs reply threads, and exposes unread and per-partner
//! conversation views.
//!
//! # Architecture
//!
//! The module follows hexagonal architecture principles:
//!
//! - **Domain**: Pure domain types ([`domain::Message`],
//!   [`domain::Notification`], [`domain::MessageHistory`], etc.)
//! - **Ports**: Abstract trait interfaces ([`ports::store::MessageStore`],
//!   [`ports::cache::ConversationCache`],
//!   [`ports::directory::UserDirectory`])
//! - **Adapters**: Concrete implementations
//!   ([`adapters::memory::InMemoryMessageStore`],
//!   [`adapters::postgres::PostgresMessageStore`])
//! - **Services**: Workflows over the ports
//!   ([`services::MessagePipeline`], [`services::ThreadResolver`],
//!   [`services::InboxService`], [`services::AccountPurge`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use missive::messaging::adapters::memory::{
//!     CacheConfig, InMemoryConversationCache, InMemoryMessageStore, InMemoryUserDirectory,
//! };
//! use missive::messaging::domain::UserId;
//! use missive::messaging::services::{MessagePipeline, SendRequest};
//! use mockable::DefaultClock;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let store = Arc::new(InMemoryMessageStore::new());
//! let cache = Arc::new(InMemoryConversationCache::new(
//!     CacheConfig::default(),
//!     DefaultClock,
//! ));
//! let directory = Arc::new(InMemoryUserDirectory::new());
//! let pipeline = MessagePipeline::new(store, cache, directory.clone(), Arc::new(DefaultClock));
//!
//! let alice = UserId::new();
//! let bob = UserId::new();
//! directory.register(alice);
//! directory.register(bob);
//!
//! let message = pipeline
//!     .send_message(SendRequest::new(alice, bob, "hello"))
//!     .await?;
//! assert_eq!(message.receiver(), bob);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
