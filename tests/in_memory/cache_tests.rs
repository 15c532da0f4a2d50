//! Conversation-listing cache behaviour across writes.

use crate::in_memory::helpers::{World, runtime, world};
use missive::messaging::{
    domain::ConversationSummary,
    ports::cache::ConversationCache,
    services::SendRequest,
};
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

/// A served listing is cached and reused.
#[rstest]
fn listing_is_served_from_cache_on_repeat(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "hello")),
    )?;

    let first = rt.block_on(w.inbox.conversations_for(w.bob))?;
    assert_eq!(w.cache.entry_count(), 1);
    let second = rt.block_on(w.inbox.conversations_for(w.bob))?;
    assert_eq!(first, second);
    Ok(())
}

/// A write affecting a cached user invalidates the entry: the next listing
/// reflects the new message, never the cached state.
#[rstest]
fn listing_reflects_writes_immediately(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "first")),
    )?;
    let before = rt.block_on(w.inbox.conversations_for(w.bob))?;
    assert_eq!(
        before.first().map(ConversationSummary::unread_from_partner),
        Some(1),
    );

    // The cache now holds Bob's listing; the next send must displace it.
    let newest = rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "second")),
    )?;

    let after = rt.block_on(w.inbox.conversations_for(w.bob))?;
    let entry = after.first().expect("one conversation");
    assert_eq!(entry.last_message().id(), newest.id());
    assert_eq!(entry.unread_from_partner(), 2);
    Ok(())
}

/// An edit also displaces both participants' cached listings.
#[rstest]
fn edit_invalidates_cached_listings(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    let message = rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "draft")),
    )?;
    rt.block_on(w.inbox.conversations_for(w.bob))?;

    rt.block_on(w.pipeline.edit_message(message.id(), w.alice, "final"))?;

    let listing = rt.block_on(w.inbox.conversations_for(w.bob))?;
    assert_eq!(
        listing
            .first()
            .map(|entry| entry.last_message().body().as_str()),
        Some("final"),
    );
    Ok(())
}

/// Invalidation only touches the affected users.
#[rstest]
fn unrelated_users_keep_their_cached_listings(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    rt.block_on(w.cache.put(w.alice, &[]))?;
    let carol = missive::messaging::domain::UserId::new();
    let dave = missive::messaging::domain::UserId::new();
    w.directory.register(carol);
    w.directory.register(dave);

    rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(carol, dave, "elsewhere")),
    )?;

    assert!(rt.block_on(w.cache.get(w.alice))?.is_some());
    Ok(())
}
