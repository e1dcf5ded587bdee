//! Statement execution: borrow a connection, run the statement on its backend, release.
//!
//! The blocking entry points here run on the caller's thread (or on a worker thread for
//! the async paths, see [`dispatch`]).

mod dispatch;

pub use dispatch::AsyncResult;
pub(crate) use dispatch::dispatch;

use tokio::runtime::Handle;
use tracing::debug;

use crate::config::AsyncFailurePolicy;
use crate::error::DatabaseError;
use crate::pool::{ConnectionPool, DbConnection, Pooled};
use crate::results::ResultCursor;
use crate::statement::Statement;
use crate::worker;

#[cfg(feature = "postgres")]
use crate::postgres;
#[cfg(feature = "sqlite")]
use crate::sqlite;

/// Everything an execution needs from a connected [`Database`](crate::Database), detached
/// from it so it can move onto a worker thread.
#[derive(Debug, Clone)]
pub(crate) struct ExecutionContext {
    pub(crate) pool: ConnectionPool,
    pub(crate) handle: Handle,
    pub(crate) policy: AsyncFailurePolicy,
}

impl ExecutionContext {
    /// Borrow a connection, blocking until one is free or the pool times out.
    pub(crate) fn connection(&self) -> Result<DbConnection, DatabaseError> {
        let pooled = worker::block_on(&self.handle, self.pool.checkout())??;
        Ok(DbConnection::new(pooled, self.handle.clone()))
    }
}

/// Blocking mutation.
pub(crate) fn update(ctx: &ExecutionContext, stmt: &Statement) -> Result<u64, DatabaseError> {
    let mut conn = ctx.connection()?;
    debug!(
        backend = ?conn.backend(),
        params = stmt.parameters().len(),
        bind = stmt.needs_binding(),
        sql = stmt.sql(),
        "executing update"
    );
    match conn.pooled_mut()? {
        #[cfg(feature = "sqlite")]
        Pooled::Sqlite(client) => sqlite::executor::execute_update(
            client,
            stmt.sql(),
            stmt.parameters(),
            stmt.needs_binding(),
        ),
        #[cfg(feature = "postgres")]
        Pooled::Postgres(client) => postgres::executor::execute_update(
            client,
            &ctx.handle,
            stmt.sql(),
            stmt.parameters(),
            stmt.needs_binding(),
        ),
    }
}

/// Blocking query; `consumer` sees the rows before the connection goes back to the pool.
pub(crate) fn query<R, F>(
    ctx: &ExecutionContext,
    stmt: &Statement,
    consumer: F,
) -> Result<R, DatabaseError>
where
    F: FnOnce(&mut ResultCursor<'_>) -> Result<R, DatabaseError>,
{
    let mut conn = ctx.connection()?;
    debug!(
        backend = ?conn.backend(),
        params = stmt.parameters().len(),
        bind = stmt.needs_binding(),
        sql = stmt.sql(),
        "executing query"
    );
    match conn.pooled_mut()? {
        #[cfg(feature = "sqlite")]
        Pooled::Sqlite(client) => sqlite::executor::execute_query(
            client,
            stmt.sql(),
            stmt.parameters(),
            stmt.needs_binding(),
            consumer,
        ),
        #[cfg(feature = "postgres")]
        Pooled::Postgres(client) => postgres::executor::execute_query(
            client,
            &ctx.handle,
            stmt.sql(),
            stmt.parameters(),
            stmt.needs_binding(),
            consumer,
        ),
    }
}
