//! Unit tests for unread views, conversation grouping, and the listing
//! cache.

use std::sync::Arc;

use chrono::Duration;
use mockall::mock;

use crate::messaging::{
    adapters::memory::{
        CacheConfig, InMemoryConversationCache, InMemoryMessageStore,
    },
    domain::{
        ContentLimits, ConversationSummary, Message, MessageBody, MessageId, Notification,
        UserId,
    },
    error::{CacheError, MessagingError},
    ports::{
        cache::{CacheResult, ConversationCache},
        store::MessageStore,
    },
    services::InboxService,
};

use super::fixtures::FixedClock;

fn body(text: &str) -> MessageBody {
    MessageBody::new(text, &ContentLimits::default()).expect("valid body")
}

struct InboxHarness {
    inbox: InboxService<InMemoryMessageStore, InMemoryConversationCache<FixedClock>>,
    store: Arc<InMemoryMessageStore>,
    cache: Arc<InMemoryConversationCache<FixedClock>>,
    clock: FixedClock,
    alice: UserId,
    bob: UserId,
    carol: UserId,
}

fn harness() -> InboxHarness {
    harness_with_ttl(CacheConfig::default())
}

fn harness_with_ttl(config: CacheConfig) -> InboxHarness {
    let clock = FixedClock::default_instant();
    let store = Arc::new(InMemoryMessageStore::new());
    let cache = Arc::new(InMemoryConversationCache::new(config, clock.clone()));
    InboxHarness {
        inbox: InboxService::new(Arc::clone(&store), Arc::clone(&cache)),
        store,
        cache,
        clock,
        alice: UserId::new(),
        bob: UserId::new(),
        carol: UserId::new(),
    }
}

impl InboxHarness {
    async fn send(&self, sender: UserId, receiver: UserId, text: &str) -> Message {
        self.clock.advance(Duration::seconds(1));
        let message = Message::new(sender, receiver, body(text), None, &self.clock);
        let notification = (sender != receiver)
            .then(|| Notification::new(receiver, message.id(), &self.clock));
        self.store
            .create(&message, notification.as_ref())
            .await
            .expect("create");
        message
    }
}

// ============================================================================
// Unread views
// ============================================================================

#[tokio::test]
async fn unread_count_tracks_incoming_unread_messages() {
    let h = harness();
    h.send(h.alice, h.bob, "one").await;
    h.send(h.alice, h.bob, "two").await;
    h.send(h.bob, h.alice, "reply").await;

    assert_eq!(h.inbox.unread_count_for(h.bob).await.expect("count"), 2);
    assert_eq!(h.inbox.unread_count_for(h.alice).await.expect("count"), 1);
}

#[tokio::test]
async fn unread_messages_are_newest_first() {
    let h = harness();
    let first = h.send(h.alice, h.bob, "one").await;
    let second = h.send(h.alice, h.bob, "two").await;

    let unread = h.inbox.unread_messages_for(h.bob).await.expect("unread");
    let ids: Vec<MessageId> = unread.iter().map(Message::id).collect();
    assert_eq!(ids, vec![second.id(), first.id()]);
}

#[tokio::test]
async fn mark_conversation_read_reports_transitions_and_clears_unread() {
    let h = harness();
    h.send(h.alice, h.bob, "one").await;
    h.send(h.alice, h.bob, "two").await;

    let transitioned = h
        .inbox
        .mark_conversation_read(h.bob, h.alice)
        .await
        .expect("mark");

    assert_eq!(transitioned, 2);
    assert_eq!(h.inbox.unread_count_for(h.bob).await.expect("count"), 0);
}

// ============================================================================
// Conversation grouping
// ============================================================================

#[tokio::test]
async fn conversations_group_by_partner_with_latest_message_first() {
    let h = harness();
    h.send(h.alice, h.bob, "to bob").await;
    h.send(h.carol, h.alice, "from carol").await;
    let latest_with_bob = h.send(h.bob, h.alice, "bob answers").await;

    let conversations = h.inbox.conversations_for(h.alice).await.expect("list");

    assert_eq!(conversations.len(), 2);
    // Partner order follows recency of the last exchanged message.
    let first = conversations.first().expect("bob entry");
    assert_eq!(first.partner(), h.bob);
    assert_eq!(first.last_message().id(), latest_with_bob.id());
    assert_eq!(first.unread_from_partner(), 1);

    let second = conversations.get(1).expect("carol entry");
    assert_eq!(second.partner(), h.carol);
    assert_eq!(second.unread_from_partner(), 1);
}

#[tokio::test]
async fn conversation_with_returns_chronological_two_party_history() {
    let h = harness();
    let first = h.send(h.alice, h.bob, "one").await;
    h.send(h.carol, h.alice, "noise").await;
    let second = h.send(h.bob, h.alice, "two").await;

    let between = h
        .inbox
        .conversation_with(h.alice, h.bob)
        .await
        .expect("history");
    let ids: Vec<MessageId> = between.iter().map(Message::id).collect();
    assert_eq!(ids, vec![first.id(), second.id()]);
}

// ============================================================================
// Listing cache
// ============================================================================

#[tokio::test]
async fn conversations_are_cached_after_first_computation() {
    let h = harness();
    h.send(h.alice, h.bob, "hello").await;

    let computed = h.inbox.conversations_for(h.bob).await.expect("first call");
    assert_eq!(h.cache.entry_count(), 1);

    let cached = h.inbox.conversations_for(h.bob).await.expect("second call");
    assert_eq!(computed, cached);
}

#[tokio::test]
async fn cached_listings_expire_after_the_ttl() {
    let h = harness_with_ttl(CacheConfig {
        ttl: Duration::seconds(60),
    });
    h.send(h.alice, h.bob, "hello").await;
    h.inbox.conversations_for(h.bob).await.expect("populate");

    h.clock.advance(Duration::seconds(61));

    assert!(h.cache.get(h.bob).await.expect("get").is_none());
}

#[tokio::test]
async fn mark_conversation_read_invalidates_cached_listings() {
    let h = harness();
    h.send(h.alice, h.bob, "hello").await;
    h.inbox.conversations_for(h.bob).await.expect("populate");
    assert_eq!(h.cache.entry_count(), 1);

    h.inbox
        .mark_conversation_read(h.bob, h.alice)
        .await
        .expect("mark");

    assert!(h.cache.get(h.bob).await.expect("get").is_none());

    let fresh = h.inbox.conversations_for(h.bob).await.expect("recompute");
    assert_eq!(fresh.first().map(ConversationSummary::unread_from_partner), Some(0));
}

// ============================================================================
// Cache degradation
// ============================================================================

mock! {
    BrokenCache {}

    #[async_trait::async_trait]
    impl ConversationCache for BrokenCache {
        async fn get(&self, user: UserId) -> CacheResult<Option<Vec<ConversationSummary>>>;
        async fn put(&self, user: UserId, conversations: &[ConversationSummary]) -> CacheResult<()>;
        async fn invalidate(&self, user: UserId) -> CacheResult<()>;
    }
}

#[tokio::test]
async fn unavailable_cache_degrades_to_live_computation() {
    let store = Arc::new(InMemoryMessageStore::new());
    let clock = FixedClock::default_instant();
    let alice = UserId::new();
    let bob = UserId::new();
    let message = Message::new(alice, bob, body("hello"), None, &clock);
    store.create(&message, None).await.expect("create");

    let mut broken = MockBrokenCache::new();
    broken
        .expect_get()
        .returning(|_| Err(CacheError::unavailable("cache down")));
    broken
        .expect_put()
        .returning(|_, _| Err(CacheError::unavailable("cache down")));

    let inbox = InboxService::new(store, Arc::new(broken));

    let conversations = inbox.conversations_for(bob).await.expect("degraded list");
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations.first().map(ConversationSummary::partner), Some(alice));
}

// ============================================================================
// History and notifications
// ============================================================================

#[tokio::test]
async fn history_for_missing_message_is_not_found() {
    let h = harness();
    let result = h.inbox.history_for(MessageId::new()).await;
    assert!(matches!(result, Err(MessagingError::MessageNotFound(_))));
}

#[tokio::test]
async fn notifications_listing_and_marking() {
    let h = harness();
    h.send(h.alice, h.bob, "one").await;
    h.send(h.alice, h.bob, "two").await;

    let rows = h.inbox.notifications_for(h.bob).await.expect("rows");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|n| !n.read()));

    let ids: Vec<_> = rows.iter().map(Notification::id).collect();
    let transitioned = h
        .inbox
        .mark_notifications_read(h.bob, &ids)
        .await
        .expect("mark");
    assert_eq!(transitioned, 2);

    let rows_after = h.inbox.notifications_for(h.bob).await.expect("rows");
    assert!(rows_after.iter().all(Notification::read));
}
