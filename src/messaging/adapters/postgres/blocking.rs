//! Blocking operation helpers for the `PostgreSQL` store.
//!
//! Offloads synchronous Diesel operations to a dedicated thread pool so the
//! async executor's workers are never blocked.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};

use crate::messaging::{error::StoreError, ports::store::StoreResult};

/// `PostgreSQL` connection pool type.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Pooled connection type returned by [`get_conn`].
pub(super) type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Runs a blocking database operation on a dedicated thread pool.
pub(super) async fn run_blocking<F, T>(f: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::connection(format!("task join error: {e}")))?
}

/// Obtains a connection from the pool.
pub(super) fn get_conn(pool: &PgPool) -> StoreResult<PooledConn> {
    pool.get().map_err(|e| StoreError::connection(e.to_string()))
}
