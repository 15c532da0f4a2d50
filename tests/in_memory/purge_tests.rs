//! Account purge flows over the in-memory stack.

use crate::in_memory::helpers::{World, runtime, world};
use missive::messaging::{ports::store::MessageStore, services::SendRequest};
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

/// Purging twice converges on the same state without error.
#[rstest]
fn purging_twice_is_idempotent(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "hello")),
    )?;

    let first = rt.block_on(w.purge.purge(w.alice))?;
    assert_eq!(first.messages_removed, 1);

    let second = rt.block_on(w.purge.purge(w.alice))?;
    assert!(second.is_empty());
    assert!(w.store.is_empty());
    Ok(())
}

/// Data belonging exclusively to other users survives a purge.
#[rstest]
fn purge_leaves_other_users_data_untouched(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    let carol = missive::messaging::domain::UserId::new();
    let dave = missive::messaging::domain::UserId::new();
    w.directory.register(carol);
    w.directory.register(dave);

    rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "doomed")),
    )?;
    let kept = rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(carol, dave, "kept")),
    )?;

    rt.block_on(w.purge.purge(w.alice))?;

    assert!(rt.block_on(w.store.find_message(kept.id()))?.is_some());
    let dave_rows = rt.block_on(w.store.notifications_for(dave))?;
    assert_eq!(dave_rows.len(), 1);
    Ok(())
}

/// The purged user's partners see fresh listings afterwards.
#[rstest]
fn partner_listings_are_recomputed_after_purge(
    runtime: io::Result<Runtime>,
    world: World,
) -> eyre::Result<()> {
    let rt = runtime?;
    let w = world;

    rt.block_on(
        w.pipeline
            .send_message(SendRequest::new(w.alice, w.bob, "hello")),
    )?;
    let before = rt.block_on(w.inbox.conversations_for(w.bob))?;
    assert_eq!(before.len(), 1);

    rt.block_on(w.purge.purge(w.alice))?;

    let after = rt.block_on(w.inbox.conversations_for(w.bob))?;
    assert!(after.is_empty());
    Ok(())
}
