//! `PostgreSQL` implementation of the [`MessageStore`] port using Diesel.
//!
//! Each port method runs as one transaction on a pooled connection, with the
//! work offloaded via [`tokio::task::spawn_blocking`]. Edits take a row lock
//! (`FOR UPDATE`) so concurrent edits to the same message serialise at the
//! database.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use super::blocking::{PgPool, get_conn, run_blocking};
use super::models::{HistoryRow, MessageRow, NewMessageRow, NotificationRow};
use super::schema::{message_history, messages, notifications};
use crate::messaging::{
    domain::{
        Message, MessageHistory, MessageId, Notification, NotificationId, UserId,
    },
    error::StoreError,
    ports::store::{EditOutcome, EditRecord, MessageStore, PurgeReport, StoreResult},
};

/// `PostgreSQL` implementation of [`MessageStore`].
///
/// Uses Diesel with r2d2 connection pooling. Thread-safe for concurrent
/// access; clones share the pool.
///
/// # Example
///
/// ```ignore
/// use diesel::PgConnection;
/// use diesel::r2d2::{ConnectionManager, Pool};
/// use missive::messaging::adapters::postgres::PostgresMessageStore;
///
/// let manager = ConnectionManager::<PgConnection>::new("postgres://...");
/// let pool = Pool::builder().build(manager)?;
/// let store = PostgresMessageStore::new(pool);
/// ```
#[derive(Debug, Clone)]
pub struct PostgresMessageStore {
    pool: PgPool,
}

impl PostgresMessageStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Collects a message id and every transitive reply beneath it.
///
/// The visited set guards against parent cycles in corrupted data, which
/// would otherwise loop forever.
fn collect_cascade(conn: &mut PgConnection, root: Uuid) -> StoreResult<Vec<Uuid>> {
    let mut seen: HashSet<Uuid> = HashSet::from([root]);
    let mut frontier = vec![root];

    while !frontier.is_empty() {
        let wanted: Vec<Option<Uuid>> = frontier.iter().copied().map(Some).collect();
        let children: Vec<Uuid> = messages::table
            .filter(messages::parent_id.eq_any(wanted))
            .select(messages::id)
            .load(conn)
            .map_err(StoreError::database)?;

        frontier = children
            .into_iter()
            .filter(|child| seen.insert(*child))
            .collect();
    }

    Ok(seen.into_iter().collect())
}

/// Deletes the given messages with their notifications and history rows.
/// Returns (messages, notifications, history) removal counts.
fn delete_message_rows(
    conn: &mut PgConnection,
    doomed: &[Uuid],
) -> StoreResult<(usize, usize, usize)> {
    let notifications_removed = diesel::delete(
        notifications::table.filter(notifications::message_id.eq_any(doomed.iter().copied())),
    )
    .execute(conn)
    .map_err(StoreError::database)?;

    let history_removed = diesel::delete(
        message_history::table.filter(message_history::message_id.eq_any(doomed.iter().copied())),
    )
    .execute(conn)
    .map_err(StoreError::database)?;

    let messages_removed =
        diesel::delete(messages::table.filter(messages::id.eq_any(doomed.iter().copied())))
            .execute(conn)
            .map_err(StoreError::database)?;

    Ok((messages_removed, notifications_removed, history_removed))
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    async fn create(
        &self,
        message: &Message,
        notification: Option<&Notification>,
    ) -> StoreResult<()> {
        let pool = self.pool.clone();
        let message_row = NewMessageRow::from_domain(message);
        let notification_row = notification.map(NotificationRow::from_domain);
        let msg_id = message.id();
        let parent = message.parent();

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            conn.transaction::<_, StoreError, _>(|tx| {
                // Pre-checks provide semantic errors; the constraints remain
                // the backstop under concurrency.
                let id_exists: i64 = messages::table
                    .filter(messages::id.eq(message_row.id))
                    .count()
                    .get_result(tx)
                    .map_err(StoreError::database)?;
                if id_exists > 0 {
                    return Err(StoreError::DuplicateMessage(msg_id));
                }

                if let Some(parent_id) = parent {
                    let parent_exists: i64 = messages::table
                        .filter(messages::id.eq(parent_id.into_inner()))
                        .count()
                        .get_result(tx)
                        .map_err(StoreError::database)?;
                    if parent_exists == 0 {
                        return Err(StoreError::ParentNotFound(parent_id));
                    }
                }

                diesel::insert_into(messages::table)
                    .values(&message_row)
                    .execute(tx)
                    .map_err(StoreError::database)?;

                if let Some(row) = &notification_row {
                    diesel::insert_into(notifications::table)
                        .values(row)
                        .execute(tx)
                        .map_err(StoreError::database)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn apply_edit(&self, edit: EditRecord) -> StoreResult<EditOutcome> {
        let pool = self.pool.clone();

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            conn.transaction::<_, StoreError, _>(|tx| {
                let current: MessageRow = messages::table
                    .find(edit.message_id.into_inner())
                    .select(MessageRow::as_select())
                    .for_update()
                    .first(tx)
                    .optional()
                    .map_err(StoreError::database)?
                    .ok_or(StoreError::MessageNotFound(edit.message_id))?;

                if current.body == edit.new_body.as_str() {
                    return Ok(EditOutcome::Unchanged(current.into_domain()));
                }

                let history = MessageHistory::new(
                    edit.history_id,
                    edit.message_id,
                    current.into_domain().body().clone(),
                    edit.edited_at,
                    edit.editor,
                );

                // History first, then the body update; both commit together.
                diesel::insert_into(message_history::table)
                    .values(HistoryRow::from_domain(&history))
                    .execute(tx)
                    .map_err(StoreError::database)?;

                let updated: MessageRow = diesel::update(
                    messages::table.find(edit.message_id.into_inner()),
                )
                .set((
                    messages::body.eq(edit.new_body.as_str().to_owned()),
                    messages::edited.eq(true),
                ))
                .returning(MessageRow::as_returning())
                .get_result(tx)
                .map_err(StoreError::database)?;

                Ok(EditOutcome::Edited {
                    message: updated.into_domain(),
                    history,
                })
            })
        })
        .await
    }

    async fn delete_message(&self, id: MessageId) -> StoreResult<()> {
        let pool = self.pool.clone();

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            conn.transaction::<_, StoreError, _>(|tx| {
                let exists: i64 = messages::table
                    .filter(messages::id.eq(id.into_inner()))
                    .count()
                    .get_result(tx)
                    .map_err(StoreError::database)?;
                if exists == 0 {
                    return Err(StoreError::MessageNotFound(id));
                }

                let doomed = collect_cascade(tx, id.into_inner())?;
                delete_message_rows(tx, &doomed)?;
                Ok(())
            })
        })
        .await
    }

    async fn delete_user(&self, user: UserId) -> StoreResult<PurgeReport> {
        let pool = self.pool.clone();
        let user_id = user.into_inner();

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            conn.transaction::<_, StoreError, _>(|tx| {
                // Gather partners before any row disappears.
                let endpoints: Vec<(Uuid, Uuid)> = messages::table
                    .filter(messages::sender.eq(user_id).or(messages::receiver.eq(user_id)))
                    .select((messages::sender, messages::receiver))
                    .load(tx)
                    .map_err(StoreError::database)?;

                let mut partners: Vec<UserId> = Vec::new();
                for (sender, receiver) in endpoints {
                    let other = if receiver == user_id { sender } else { receiver };
                    if other != user_id {
                        let partner = UserId::from_uuid(other);
                        if !partners.contains(&partner) {
                            partners.push(partner);
                        }
                    }
                }

                let doomed: Vec<Uuid> = messages::table
                    .filter(messages::sender.eq(user_id))
                    .select(messages::id)
                    .load(tx)
                    .map_err(StoreError::database)?;

                let (messages_removed, mut notifications_removed, mut history_removed) =
                    delete_message_rows(tx, &doomed)?;

                notifications_removed += diesel::delete(
                    notifications::table.filter(notifications::user_id.eq(user_id)),
                )
                .execute(tx)
                .map_err(StoreError::database)?;

                history_removed += diesel::delete(
                    message_history::table.filter(message_history::edited_by.eq(user_id)),
                )
                .execute(tx)
                .map_err(StoreError::database)?;

                Ok(PurgeReport {
                    partners,
                    messages_removed,
                    notifications_removed,
                    history_removed,
                })
            })
        })
        .await
    }

    async fn find_message(&self, id: MessageId) -> StoreResult<Option<Message>> {
        let pool = self.pool.clone();

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let row: Option<MessageRow> = messages::table
                .find(id.into_inner())
                .select(MessageRow::as_select())
                .first(&mut conn)
                .optional()
                .map_err(StoreError::database)?;
            Ok(row.map(MessageRow::into_domain))
        })
        .await
    }

    async fn replies_to(&self, parent: MessageId) -> StoreResult<Vec<Message>> {
        let pool = self.pool.clone();

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let rows: Vec<MessageRow> = messages::table
                .filter(messages::parent_id.eq(Some(parent.into_inner())))
                .order((messages::created_at.asc(), messages::id.asc()))
                .select(MessageRow::as_select())
                .load(&mut conn)
                .map_err(StoreError::database)?;
            Ok(rows.into_iter().map(MessageRow::into_domain).collect())
        })
        .await
    }

    async fn messages_for_user(&self, user: UserId) -> StoreResult<Vec<Message>> {
        let pool = self.pool.clone();
        let user_id = user.into_inner();

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let rows: Vec<MessageRow> = messages::table
                .filter(messages::sender.eq(user_id).or(messages::receiver.eq(user_id)))
                .order((messages::created_at.desc(), messages::id.desc()))
                .select(MessageRow::as_select())
                .load(&mut conn)
                .map_err(StoreError::database)?;
            Ok(rows.into_iter().map(MessageRow::into_domain).collect())
        })
        .await
    }

    async fn messages_between(&self, a: UserId, b: UserId) -> StoreResult<Vec<Message>> {
        let pool = self.pool.clone();
        let (a, b) = (a.into_inner(), b.into_inner());

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let rows: Vec<MessageRow> = messages::table
                .filter(
                    messages::sender
                        .eq(a)
                        .and(messages::receiver.eq(b))
                        .or(messages::sender.eq(b).and(messages::receiver.eq(a))),
                )
                .order((messages::created_at.asc(), messages::id.asc()))
                .select(MessageRow::as_select())
                .load(&mut conn)
                .map_err(StoreError::database)?;
            Ok(rows.into_iter().map(MessageRow::into_domain).collect())
        })
        .await
    }

    async fn unread_for(&self, user: UserId) -> StoreResult<Vec<Message>> {
        let pool = self.pool.clone();
        let user_id = user.into_inner();

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let rows: Vec<MessageRow> = messages::table
                .filter(messages::receiver.eq(user_id).and(messages::read.eq(false)))
                .order((messages::created_at.desc(), messages::id.desc()))
                .select(MessageRow::as_select())
                .load(&mut conn)
                .map_err(StoreError::database)?;
            Ok(rows.into_iter().map(MessageRow::into_domain).collect())
        })
        .await
    }

    async fn history_for(&self, message: MessageId) -> StoreResult<Vec<MessageHistory>> {
        let pool = self.pool.clone();

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let rows: Vec<HistoryRow> = message_history::table
                .filter(message_history::message_id.eq(message.into_inner()))
                .order((message_history::edited_at.desc(), message_history::id.desc()))
                .select(HistoryRow::as_select())
                .load(&mut conn)
                .map_err(StoreError::database)?;
            Ok(rows.into_iter().map(HistoryRow::into_domain).collect())
        })
        .await
    }

    async fn notifications_for(&self, user: UserId) -> StoreResult<Vec<Notification>> {
        let pool = self.pool.clone();

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let rows: Vec<NotificationRow> = notifications::table
                .filter(notifications::user_id.eq(user.into_inner()))
                .order((notifications::created_at.desc(), notifications::id.desc()))
                .select(NotificationRow::as_select())
                .load(&mut conn)
                .map_err(StoreError::database)?;
            Ok(rows.into_iter().map(NotificationRow::into_domain).collect())
        })
        .await
    }

    async fn mark_conversation_read(&self, user: UserId, partner: UserId) -> StoreResult<usize> {
        let pool = self.pool.clone();
        let (user_id, partner_id) = (user.into_inner(), partner.into_inner());

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            diesel::update(
                messages::table.filter(
                    messages::receiver
                        .eq(user_id)
                        .and(messages::sender.eq(partner_id))
                        .and(messages::read.eq(false)),
                ),
            )
            .set(messages::read.eq(true))
            .execute(&mut conn)
            .map_err(StoreError::database)
        })
        .await
    }

    async fn mark_notifications_read(
        &self,
        user: UserId,
        ids: &[NotificationId],
    ) -> StoreResult<usize> {
        let pool = self.pool.clone();
        let user_id = user.into_inner();
        let id_values: Vec<Uuid> = ids.iter().copied().map(NotificationId::into_inner).collect();

        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            diesel::update(
                notifications::table.filter(
                    notifications::user_id
                        .eq(user_id)
                        .and(notifications::id.eq_any(id_values))
                        .and(notifications::read.eq(false)),
                ),
            )
            .set(notifications::read.eq(true))
            .execute(&mut conn)
            .map_err(StoreError::database)
        })
        .await
    }
}
