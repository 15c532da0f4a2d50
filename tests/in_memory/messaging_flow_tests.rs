//! End-to-end messaging flows over the in-memory stack.
//!
//! Walks the full lifecycle: send with notification, edit with history,
//! reply with thread reconstruction, and the read-state transitions in
//! between.

use crate::in_memory::helpers::{World, runtime, world};
use missive::messaging::{
    domain::{Message, MessageId},
    ports::store::MessageStore,
    services::SendRequest,
};
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

/// Walks the canonical two-user exchange end to end.
#[rstest]
fn two_user_exchange_with_edit_and_reply(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    // Alice sends "hi" to Bob: Bob's unread count becomes 1.
    let hello = rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "hi")),
    )?;
    assert_eq!(rt.block_on(w.inbox.unread_count_for(w.bob))?, 1);

    // Alice edits to "hello": one history row holds the prior content.
    let outcome = rt.block_on(w.pipeline.edit_message(hello.id(), w.alice, "hello"))?;
    assert!(outcome.changed());
    assert!(outcome.message().edited());
    assert_eq!(outcome.message().body().as_str(), "hello");

    let history = rt.block_on(w.inbox.history_for(hello.id()))?;
    assert_eq!(history.len(), 1);
    assert_eq!(history.first().map(|row| row.old_body().as_str()), Some("hi"));

    // Bob replies in thread: both messages resolve to the same thread.
    let reply = rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.bob, w.alice, "hey").in_reply_to(hello.id())),
    )?;

    let from_root = rt.block_on(w.resolver.resolve(hello.id()))?;
    let from_reply = rt.block_on(w.resolver.resolve(reply.id()))?;
    let mut root_ids: Vec<MessageId> = from_root.iter().map(Message::id).collect();
    let mut reply_ids: Vec<MessageId> = from_reply.iter().map(Message::id).collect();
    root_ids.sort_by_key(|id| id.into_inner());
    reply_ids.sort_by_key(|id| id.into_inner());
    assert_eq!(root_ids, reply_ids);
    assert_eq!(from_root.len(), 2);

    // Alice is deleted: her sent message, her notifications, and her history
    // rows disappear while Bob's reply survives.
    rt.block_on(w.purge.purge(w.alice))?;

    assert!(rt.block_on(w.store.find_message(hello.id()))?.is_none());
    assert!(rt.block_on(w.store.find_message(reply.id()))?.is_some());
    assert!(rt.block_on(w.store.history_for(hello.id()))?.is_empty());
    assert!(rt.block_on(w.store.notifications_for(w.alice))?.is_empty());
    assert!(rt.block_on(w.store.notifications_for(w.bob))?.is_empty());
    Ok(())
}

/// A message to another user derives exactly one notification.
#[rstest]
fn cross_user_message_notifies_the_receiver_once(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    let message = rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "ping")),
    )?;

    let rows = rt.block_on(w.inbox.notifications_for(w.bob))?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.first().map(|n| n.message()), Some(message.id()));
    Ok(())
}

/// A self-addressed message derives no notification.
#[rstest]
fn self_message_produces_no_notification(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.alice, "reminder")),
    )?;

    assert!(rt.block_on(w.inbox.notifications_for(w.alice))?.is_empty());
    Ok(())
}

/// Edits that change nothing leave no trace.
#[rstest]
fn no_op_edit_leaves_no_history(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    let message = rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "same")),
    )?;
    let outcome = rt.block_on(w.pipeline.edit_message(message.id(), w.alice, "same"))?;

    assert!(!outcome.changed());
    assert!(rt.block_on(w.inbox.history_for(message.id()))?.is_empty());
    Ok(())
}

/// Repeated edits stack history rows, most recent prior content first.
#[rstest]
fn repeated_edits_accumulate_ordered_history(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    let message = rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "v1")),
    )?;
    rt.block_on(w.pipeline.edit_message(message.id(), w.alice, "v2"))?;
    rt.block_on(w.pipeline.edit_message(message.id(), w.alice, "v3"))?;

    let history = rt.block_on(w.inbox.history_for(message.id()))?;
    let bodies: Vec<&str> = history.iter().map(|row| row.old_body().as_str()).collect();
    assert_eq!(bodies, vec!["v2", "v1"]);
    Ok(())
}

/// Reading a conversation clears its unread messages.
#[rstest]
fn reading_a_conversation_clears_unread(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "one")),
    )?;
    rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "two")),
    )?;
    assert_eq!(rt.block_on(w.inbox.unread_count_for(w.bob))?, 2);

    let transitioned = rt.block_on(w.inbox.mark_conversation_read(w.bob, w.alice))?;
    assert_eq!(transitioned, 2);
    assert_eq!(rt.block_on(w.inbox.unread_count_for(w.bob))?, 0);
    Ok(())
}
