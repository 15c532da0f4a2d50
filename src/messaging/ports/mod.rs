//! Port traits for external interactions of the messaging subsystem.
//!
//! Ports abstract the persistence provider, the conversation-listing cache,
//! and the identity provider so that services stay infrastructure-agnostic.

pub mod cache;
pub mod directory;
pub mod store;
