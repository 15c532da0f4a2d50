//! In-memory integration tests for the messaging engine.
//!
//! Tests are organised into modules by functionality:
//! - `messaging_flow_tests`: send/edit/reply flows and their derived rows
//! - `cache_tests`: conversation-listing cache correctness across writes
//! - `purge_tests`: account deletion cascades and idempotence

mod in_memory {
    pub mod helpers;

    mod cache_tests;
    mod messaging_flow_tests;
    mod purge_tests;
}
