#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::fmt;

use bb8::PooledConnection;
use tokio::runtime::Handle;

#[cfg(feature = "postgres")]
use crate::postgres::PgManager;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteManager;

use crate::config::Backend;
use crate::error::DatabaseError;

pub(crate) enum Pooled {
    #[cfg(feature = "postgres")]
    Postgres(PooledConnection<'static, PgManager>),
    #[cfg(feature = "sqlite")]
    Sqlite(PooledConnection<'static, SqliteManager>),
}

/// A connection borrowed from the pool; dropping it returns it.
pub struct DbConnection {
    // `None` only while dropping
    inner: Option<Pooled>,
    backend: Backend,
    handle: Handle,
}

impl DbConnection {
    pub(crate) fn new(inner: Pooled, handle: Handle) -> Self {
        let backend = match &inner {
            #[cfg(feature = "postgres")]
            Pooled::Postgres(_) => Backend::Postgres,
            #[cfg(feature = "sqlite")]
            Pooled::Sqlite(_) => Backend::Sqlite,
        };
        Self {
            inner: Some(inner),
            backend,
            handle,
        }
    }

    pub(crate) fn pooled_mut(&mut self) -> Result<&mut Pooled, DatabaseError> {
        self.inner.as_mut().ok_or(DatabaseError::NotConnected)
    }

    /// Backend this connection talks to.
    #[must_use]
    pub fn backend(&self) -> Backend {
        self.backend
    }
}

impl Drop for DbConnection {
    fn drop(&mut self) {
        // bb8 may spawn replenishment tasks when a broken connection comes back
        let _enter = self.handle.enter();
        self.inner.take();
    }
}

impl fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConnection")
            .field("backend", &self.backend())
            .finish_non_exhaustive()
    }
}
