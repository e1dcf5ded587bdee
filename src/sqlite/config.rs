use std::future::Future;
use std::time::Duration;

use bb8::ManageConnection;
use rusqlite::{Connection, OpenFlags};

use crate::error::DriverError;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// bb8 manager for `SQLite` connections opened from a `file:` URI.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    uri: String,
}

impl SqliteManager {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    fn open(&self) -> Result<Connection, DriverError> {
        // the default flags include SQLITE_OPEN_URI, so query options in the trail apply
        let conn = Connection::open_with_flags(&self.uri, OpenFlags::default())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }
}

impl ManageConnection for SqliteManager {
    type Connection = Connection;
    type Error = DriverError;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let opened = self.open();
        async move { opened }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let checked = conn
            .query_row("SELECT 1", [], |_| Ok(()))
            .map_err(DriverError::from);
        async move { checked }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_uri_with_query_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opened.db");
        let manager = SqliteManager::new(format!("file:{}?mode=rwc", path.display()));
        let conn = manager.open().unwrap();
        conn.execute_batch("CREATE TABLE t(x INTEGER);").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn read_only_mode_rejects_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let manager = SqliteManager::new(format!("file:{}?mode=ro", path.display()));
        assert!(matches!(manager.open(), Err(DriverError::Sqlite(_))));
    }
}
