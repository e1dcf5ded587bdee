use std::fmt;

use bb8::{Builder, ErrorSink, ManageConnection, Pool};
use tracing::warn;

use super::connection::Pooled;
use crate::config::{Backend, DatabaseConfig, PoolSettings};
use crate::error::DatabaseError;
#[cfg(feature = "postgres")]
use crate::postgres::PgManager;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteManager;

/// Connection pool for the configured backend.
#[derive(Debug, Clone)]
pub enum ConnectionPool {
    /// `PostgreSQL` connection pool
    #[cfg(feature = "postgres")]
    Postgres(Pool<PgManager>),
    /// `SQLite` connection pool
    #[cfg(feature = "sqlite")]
    Sqlite(Pool<SqliteManager>),
}

/// Snapshot of a pool's connection counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Open connections, idle or borrowed.
    pub connections: u32,
    /// Open connections waiting in the pool.
    pub idle_connections: u32,
}

impl PoolStatus {
    /// Connections currently borrowed.
    #[must_use]
    pub fn in_use(&self) -> u32 {
        self.connections.saturating_sub(self.idle_connections)
    }
}

impl ConnectionPool {
    /// Build the pool without opening any connection.
    ///
    /// Must run inside the worker runtime's context: bb8 starts its reaper and `min_idle`
    /// replenishment as tasks.
    pub(crate) fn build(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let settings = config.settings();
        settings.validate()?;
        Ok(match config.backend {
            #[cfg(feature = "postgres")]
            Backend::Postgres => ConnectionPool::Postgres(
                builder(settings).build_unchecked(PgManager::from_config(config)?),
            ),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite => ConnectionPool::Sqlite(
                builder(settings).build_unchecked(SqliteManager::new(config.connection_uri())),
            ),
        })
    }

    /// Borrow a connection that stays out of the pool until dropped.
    pub(crate) async fn checkout(&self) -> Result<Pooled, DatabaseError> {
        Ok(match self {
            #[cfg(feature = "postgres")]
            ConnectionPool::Postgres(pool) => Pooled::Postgres(pool.get_owned().await?),
            #[cfg(feature = "sqlite")]
            ConnectionPool::Sqlite(pool) => Pooled::Sqlite(pool.get_owned().await?),
        })
    }

    #[must_use]
    pub fn backend(&self) -> Backend {
        match self {
            #[cfg(feature = "postgres")]
            ConnectionPool::Postgres(_) => Backend::Postgres,
            #[cfg(feature = "sqlite")]
            ConnectionPool::Sqlite(_) => Backend::Sqlite,
        }
    }

    #[must_use]
    pub fn status(&self) -> PoolStatus {
        match self {
            #[cfg(feature = "postgres")]
            ConnectionPool::Postgres(pool) => status_of(pool),
            #[cfg(feature = "sqlite")]
            ConnectionPool::Sqlite(pool) => status_of(pool),
        }
    }
}

fn status_of<M: ManageConnection>(pool: &Pool<M>) -> PoolStatus {
    let state = pool.state();
    PoolStatus {
        connections: state.connections,
        idle_connections: state.idle_connections,
    }
}

/// Logs connection failures the pool hits while opening connections in the background.
#[derive(Debug, Clone, Copy)]
struct LogOpenErrors;

impl<E: fmt::Display + Send + 'static> ErrorSink<E> for LogOpenErrors {
    fn sink(&self, error: E) {
        warn!(error = %error, "failed to open a pooled connection");
    }

    fn boxed_clone(&self) -> Box<dyn ErrorSink<E>> {
        Box::new(*self)
    }
}

// A failed open is logged and not retried; waiting callers time out.
fn builder<M>(settings: &PoolSettings) -> Builder<M>
where
    M: ManageConnection,
    M::Error: fmt::Display,
{
    Pool::builder()
        .max_size(settings.max_pool_size)
        .min_idle(settings.min_idle)
        .connection_timeout(settings.connection_timeout)
        .idle_timeout(settings.idle_timeout)
        .max_lifetime(settings.max_lifetime)
        .retry_connection(false)
        .error_sink(Box::new(LogOpenErrors))
}
