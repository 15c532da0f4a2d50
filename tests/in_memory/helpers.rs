//! Shared test helpers for in-memory integration tests.

use std::io;
use std::sync::Arc;

use missive::messaging::{
    adapters::memory::{
        CacheConfig, InMemoryConversationCache, InMemoryMessageStore, InMemoryUserDirectory,
    },
    domain::UserId,
    services::{AccountPurge, InboxService, MessagePipeline, ThreadResolver},
};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::runtime::Runtime;

/// The full in-memory service stack under test.
pub struct World {
    /// The shared entity store.
    pub store: Arc<InMemoryMessageStore>,
    /// The conversation-listing cache.
    pub cache: Arc<InMemoryConversationCache<DefaultClock>>,
    /// The identity directory.
    pub directory: Arc<InMemoryUserDirectory>,
    /// The mutation pipeline.
    pub pipeline: MessagePipeline<
        InMemoryMessageStore,
        InMemoryConversationCache<DefaultClock>,
        InMemoryUserDirectory,
        DefaultClock,
    >,
    /// The thread resolver.
    pub resolver: ThreadResolver<InMemoryMessageStore>,
    /// The inbox read-model service.
    pub inbox: InboxService<InMemoryMessageStore, InMemoryConversationCache<DefaultClock>>,
    /// The account purge service.
    pub purge: AccountPurge<InMemoryMessageStore, InMemoryConversationCache<DefaultClock>>,
    /// A registered user.
    pub alice: UserId,
    /// Another registered user.
    pub bob: UserId,
}

/// Provides a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Provides a fresh service stack with two registered users.
#[fixture]
pub fn world() -> World {
    let store = Arc::new(InMemoryMessageStore::new());
    let cache = Arc::new(InMemoryConversationCache::new(
        CacheConfig::default(),
        DefaultClock,
    ));
    let directory = Arc::new(InMemoryUserDirectory::new());

    let alice = UserId::new();
    let bob = UserId::new();
    directory.register(alice);
    directory.register(bob);

    let pipeline = MessagePipeline::new(
        Arc::clone(&store),
        Arc::clone(&cache),
        Arc::clone(&directory),
        Arc::new(DefaultClock),
    );
    let resolver = ThreadResolver::new(Arc::clone(&store));
    let inbox = InboxService::new(Arc::clone(&store), Arc::clone(&cache));
    let purge = AccountPurge::new(Arc::clone(&store), Arc::clone(&cache));

    World {
        store,
        cache,
        directory,
        pipeline,
        resolver,
        inbox,
        purge,
        alice,
        bob,
    }
}
