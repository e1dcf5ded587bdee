mod connection;
mod types;

pub use connection::DbConnection;
pub(crate) use connection::Pooled;
pub use types::{ConnectionPool, PoolStatus};

use tokio::runtime::Handle;
use tracing::info;

use crate::config::{AsyncFailurePolicy, DatabaseConfig};
use crate::error::DatabaseError;
use crate::executor::ExecutionContext;
use crate::schema::{Table, create_table_sql};
use crate::statement::Statement;
use crate::worker::{self, WorkerPool};

struct Live {
    pool: ConnectionPool,
    handle: Handle,
    policy: AsyncFailurePolicy,
    uri: String,
}

/// Pool manager: owns the live connection pool and the worker pool behind async execution.
///
/// Each `Database` is independent; several can be connected at once.
///
/// ```rust,no_run
/// use sql_wrapper::prelude::*;
///
/// # fn main() -> Result<(), DatabaseError> {
/// let mut db = Database::new();
/// db.connect(
///     Database::configure()
///         .backend(Backend::Sqlite)
///         .name("app.db")
///         .max_pool_size(4)?,
/// )?;
/// let removed = Statement::raw("DELETE FROM sessions").execute_update(&db)?;
/// db.shutdown()?;
/// # Ok(()) }
/// ```
#[derive(Default)]
pub struct Database {
    // dropped before the worker pool it runs on
    live: Option<Live>,
    worker: WorkerPool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("connected", &self.is_connected())
            .field("uri", &self.connection_uri())
            .field("worker", &self.worker)
            .finish()
    }
}

impl Database {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh, empty configuration.
    #[must_use]
    pub fn configure() -> DatabaseConfig {
        DatabaseConfig::new()
    }

    /// Create the connection pool described by `config`.
    ///
    /// The pool opens connections on demand unless
    /// [`verify_on_connect`](DatabaseConfig::verify_on_connect) is set. When the
    /// configuration supplies no worker runtime, one is started the first time it's needed
    /// and kept until this `Database` is dropped.
    ///
    /// # Errors
    /// [`DatabaseError::AlreadyConnected`] if a pool is live,
    /// [`DatabaseError::IncompleteCredentials`] if a required field is unset,
    /// [`DatabaseError::Validation`] for pool settings or URIs the pool or driver reject,
    /// [`DatabaseError::WorkerPool`] if the default runtime can't start, and
    /// [`DatabaseError::ConnectionAcquisition`] if verification can't borrow a connection.
    pub fn connect(&mut self, mut config: DatabaseConfig) -> Result<(), DatabaseError> {
        if self.live.is_some() {
            return Err(DatabaseError::AlreadyConnected);
        }
        if !config.credentials_complete() {
            return Err(DatabaseError::IncompleteCredentials {
                missing: config.missing_credentials(),
            });
        }
        let handle = self.worker.activate(config.worker.take())?;
        let pool = {
            let _enter = handle.enter();
            ConnectionPool::build(&config)?
        };
        if config.verify_on_connect {
            drop(worker::block_on(&handle, pool.checkout())??);
        }
        let uri = config.connection_uri();
        info!(
            backend = ?config.backend,
            uri = %uri,
            max_pool_size = config.settings().max_pool_size,
            "database connected"
        );
        self.live = Some(Live {
            pool,
            handle,
            policy: config.async_failure_policy,
            uri,
        });
        Ok(())
    }

    /// Close the pool. The worker pool keeps running for a later [`connect`](Self::connect).
    ///
    /// Connections still borrowed close when they are dropped.
    ///
    /// # Errors
    /// [`DatabaseError::NotConnected`] if no pool is live.
    pub fn shutdown(&mut self) -> Result<(), DatabaseError> {
        let live = self.live.take().ok_or(DatabaseError::NotConnected)?;
        let _enter = live.handle.enter();
        let status = live.pool.status();
        drop(live.pool);
        info!(
            uri = %live.uri,
            open_connections = status.connections,
            "database shut down"
        );
        Ok(())
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.live.is_some()
    }

    /// The URI the live pool connects to. Credentials are never part of it.
    #[must_use]
    pub fn connection_uri(&self) -> Option<&str> {
        self.live.as_ref().map(|live| live.uri.as_str())
    }

    /// Connection counts of the live pool.
    ///
    /// # Errors
    /// [`DatabaseError::NotConnected`] if no pool is live.
    pub fn pool_status(&self) -> Result<PoolStatus, DatabaseError> {
        self.live
            .as_ref()
            .map(|live| live.pool.status())
            .ok_or(DatabaseError::NotConnected)
    }

    /// Borrow a connection, blocking until one is available.
    ///
    /// Must not be called from inside an async task; use
    /// [`get_connection_async`](Self::get_connection_async) there.
    ///
    /// # Errors
    /// [`DatabaseError::NotConnected`] if no pool is live,
    /// [`DatabaseError::ConnectionAcquisition`] if the pool can't provide one in time.
    pub fn get_connection(&self) -> Result<DbConnection, DatabaseError> {
        self.context()?.connection()
    }

    /// Borrow a connection without blocking the calling task.
    ///
    /// # Errors
    /// As [`get_connection`](Self::get_connection).
    pub async fn get_connection_async(&self) -> Result<DbConnection, DatabaseError> {
        let ctx = self.context()?;
        let pool = ctx.pool.clone();
        let pooled = ctx.handle.spawn(async move { pool.checkout().await }).await??;
        Ok(DbConnection::new(pooled, ctx.handle))
    }

    /// Run `CREATE TABLE IF NOT EXISTS` for `table`.
    ///
    /// # Errors
    /// As [`Statement::execute_update`].
    pub fn create_table<T: Table + ?Sized>(&self, table: &T) -> Result<(), DatabaseError> {
        Statement::raw(create_table_sql(table))
            .execute_update(self)
            .map(|_| ())
    }

    /// [`create_table`](Self::create_table) for each table, in order, stopping at the first
    /// failure.
    ///
    /// # Errors
    /// As [`Statement::execute_update`].
    pub fn create_tables(&self, tables: &[&dyn Table]) -> Result<(), DatabaseError> {
        tables.iter().try_for_each(|table| self.create_table(*table))
    }

    pub(crate) fn context(&self) -> Result<ExecutionContext, DatabaseError> {
        let live = self.live.as_ref().ok_or(DatabaseError::NotConnected)?;
        Ok(ExecutionContext {
            pool: live.pool.clone(),
            handle: live.handle.clone(),
            policy: live.policy,
        })
    }
}
