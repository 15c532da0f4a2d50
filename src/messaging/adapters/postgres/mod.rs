//! `PostgreSQL` adapters for the messaging ports, built on Diesel.

mod blocking;
mod models;
mod schema;
mod store;

pub use blocking::PgPool;
pub use models::{HistoryRow, MessageRow, NewMessageRow, NotificationRow};
pub use store::PostgresMessageStore;
